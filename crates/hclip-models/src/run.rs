//! Run identity and source video references.

use std::fmt;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The long-form video a run works on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceVideo {
    /// File on the local filesystem
    Path(PathBuf),
    /// Remote URL readable by both FFmpeg and the analysis service
    Url(String),
}

impl SourceVideo {
    /// Interpret `input` as a URL when it has an http(s) scheme, else as a path.
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            SourceVideo::Url(input.to_string())
        } else {
            SourceVideo::Path(PathBuf::from(input))
        }
    }

    /// The string handed to FFmpeg's `-i`.
    pub fn as_ffmpeg_input(&self) -> String {
        match self {
            SourceVideo::Path(path) => path.to_string_lossy().to_string(),
            SourceVideo::Url(url) => url.clone(),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            SourceVideo::Path(path) => Some(path),
            SourceVideo::Url(_) => None,
        }
    }
}

impl fmt::Display for SourceVideo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ffmpeg_input())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
        assert_eq!(RunId::from_string("run-1").as_str(), "run-1");
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            SourceVideo::parse("https://example.com/v.mp4"),
            SourceVideo::Url("https://example.com/v.mp4".to_string())
        );

        let local = SourceVideo::parse("videos/talk.mp4");
        assert_eq!(local.local_path(), Some(Path::new("videos/talk.mp4")));
        assert_eq!(local.as_ffmpeg_input(), "videos/talk.mp4");
    }

    #[test]
    fn test_source_serde() {
        let json = serde_json::to_value(SourceVideo::Url("https://x/y.mp4".into())).unwrap();
        assert_eq!(json["url"], "https://x/y.mp4");
    }
}
