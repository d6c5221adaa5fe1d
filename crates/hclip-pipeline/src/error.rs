//! Pipeline error types.

use std::fmt;

use thiserror::Error;

use hclip_media::MediaError;
use hclip_models::{CropFailure, HighlightsRecordError};
use hclip_remote::RemoteError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Stage of a run, used to label failures and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Setup,
    Detection,
    Cutting,
    Cropping,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Setup => "setup",
            Stage::Detection => "detection",
            Stage::Cutting => "cutting",
            Stage::Cropping => "cropping",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to prepare scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Highlight detection failed: {0}")]
    Detection(#[from] RemoteError),

    #[error(transparent)]
    InvalidHighlights(#[from] HighlightsRecordError),

    #[error("Detection finished without a highlights record")]
    HighlightsMissing,

    #[error("Failed to cut segment '{title}': {source}")]
    SegmentCut {
        title: String,
        #[source]
        source: MediaError,
    },

    /// A single crop job failed. Only surfaced by `ResultStream::next_record`.
    #[error("Crop job for '{title}' failed: {failure}")]
    Crop { title: String, failure: CropFailure },
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn segment_cut(title: impl Into<String>, source: MediaError) -> Self {
        Self::SegmentCut {
            title: title.into(),
            source,
        }
    }

    /// The run stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Config(_) | PipelineError::Scratch(_) => Stage::Setup,
            PipelineError::Detection(_)
            | PipelineError::InvalidHighlights(_)
            | PipelineError::HighlightsMissing => Stage::Detection,
            PipelineError::SegmentCut { .. } => Stage::Cutting,
            PipelineError::Crop { .. } => Stage::Cropping,
        }
    }

    /// Whether this error ended the run. Per-job crop failures do not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineError::Crop { .. })
    }
}
