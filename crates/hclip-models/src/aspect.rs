//! Target aspect ratios accepted by the auto-crop service.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Output aspect ratio (W:H).
///
/// Only the ratios in [`AspectRatio::SUPPORTED`] can be constructed through
/// parsing or deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Square (1:1)
    pub const SQUARE: AspectRatio = AspectRatio::new(1, 1);

    /// Classic landscape (4:3)
    pub const CLASSIC: AspectRatio = AspectRatio::new(4, 3);

    /// Classic portrait (3:4)
    pub const CLASSIC_PORTRAIT: AspectRatio = AspectRatio::new(3, 4);

    /// Instagram portrait (4:5)
    pub const INSTAGRAM_PORTRAIT: AspectRatio = AspectRatio::new(4, 5);

    /// Large-format landscape (5:4)
    pub const LARGE_FORMAT: AspectRatio = AspectRatio::new(5, 4);

    /// Standard portrait (9:16) for TikTok/Reels/Shorts
    pub const PORTRAIT: AspectRatio = AspectRatio::new(9, 16);

    /// Every ratio the crop service understands.
    pub const SUPPORTED: &'static [AspectRatio] = &[
        AspectRatio::SQUARE,
        AspectRatio::CLASSIC,
        AspectRatio::CLASSIC_PORTRAIT,
        AspectRatio::INSTAGRAM_PORTRAIT,
        AspectRatio::LARGE_FORMAT,
        AspectRatio::PORTRAIT,
    ];

    const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| AspectRatioParseError::InvalidFormat(s.to_string()))?;

        let width: u32 = w
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(w.to_string()))?;
        let height: u32 = h
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(h.to_string()))?;

        Self::SUPPORTED
            .iter()
            .copied()
            .find(|r| r.width == width && r.height == height)
            .ok_or_else(|| AspectRatioParseError::Unsupported(s.to_string()))
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

impl Serialize for AspectRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AspectRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for AspectRatio {
    fn schema_name() -> String {
        "AspectRatio".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

#[derive(Debug, Error)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),
    #[error("Invalid number in aspect ratio: {0}")]
    InvalidNumber(String),
    #[error("Unsupported aspect ratio: {0} (expected one of 1:1, 4:3, 3:4, 4:5, 5:4, 9:16)")]
    Unsupported(String),
}
