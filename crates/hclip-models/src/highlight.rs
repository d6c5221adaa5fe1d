//! Highlight (segment) models.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Key that marks the authoritative record in the analysis result stream.
pub const HIGHLIGHTS_KEY: &str = "highlights";

/// A highlight as reported by the detection service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawHighlight {
    pub title: String,
    pub score: f64,
    pub start_time: f64,
    pub end_time: f64,
}

/// A normalized highlight flowing through the pipeline.
///
/// Produced by the lister; `source_clip_path` is filled in once the segment
/// has been cut to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightDescriptor {
    /// Highlight title (unsanitized)
    pub title: String,

    /// Detection score
    pub score: f64,

    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Local path of the cut clip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_clip_path: Option<PathBuf>,
}

impl HighlightDescriptor {
    pub fn new(title: impl Into<String>, score: f64, start_time: f64, end_time: f64) -> Self {
        Self {
            title: title.into(),
            score,
            start_time,
            end_time,
            source_clip_path: None,
        }
    }

    /// Duration of the segment in seconds (zero for inverted ranges).
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Return a copy bound to the clip file at `path`.
    pub fn with_clip_path(mut self, path: impl AsRef<Path>) -> Self {
        self.source_clip_path = Some(path.as_ref().to_path_buf());
        self
    }
}

impl From<RawHighlight> for HighlightDescriptor {
    fn from(raw: RawHighlight) -> Self {
        Self::new(raw.title, raw.score, raw.start_time, raw.end_time)
    }
}

#[derive(Debug, Error)]
#[error("Malformed highlights record: {0}")]
pub struct HighlightsRecordError(#[from] serde_json::Error);

/// Extract the highlight list from one analysis result record.
///
/// Returns `None` when the record does not carry a `highlights` field.
pub fn highlights_from_record(
    record: &Value,
) -> Option<Result<Vec<HighlightDescriptor>, HighlightsRecordError>> {
    let highlights = record.as_object()?.get(HIGHLIGHTS_KEY)?;

    Some(
        Vec::<RawHighlight>::deserialize(highlights)
            .map(|raw| raw.into_iter().map(HighlightDescriptor::from).collect())
            .map_err(HighlightsRecordError::from),
    )
}
