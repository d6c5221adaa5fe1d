//! Crop job references, per-job outcomes and caller-facing output records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::HighlightDescriptor;

/// Opaque reference to a job submitted to the auto-crop service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CropJobRef(pub String);

impl CropJobRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CropJobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a cropped output video (URL or local path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CroppedVideo {
    pub location: String,
}

impl CroppedVideo {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

/// Why an individual crop job failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CropFailureKind {
    /// The job could not be submitted
    Submission,
    /// The service reported the job as failed
    Remote,
    /// The job did not finish within the configured timeout
    Timeout,
}

impl CropFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropFailureKind::Submission => "submission",
            CropFailureKind::Remote => "remote",
            CropFailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for CropFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A per-job failure, reported as data rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CropFailure {
    pub kind: CropFailureKind,
    pub message: String,
}

impl CropFailure {
    pub fn new(kind: CropFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for CropFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}

impl std::error::Error for CropFailure {}

/// Terminal outcome of one crop job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CroppedResult {
    /// The highlight this job was submitted for
    pub descriptor: HighlightDescriptor,

    /// Cropped output (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<CroppedVideo>,

    /// Failure details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CropFailure>,

    pub completed_at: DateTime<Utc>,
}

impl CroppedResult {
    pub fn succeeded(descriptor: HighlightDescriptor, video: CroppedVideo) -> Self {
        Self {
            descriptor,
            video: Some(video),
            error: None,
            completed_at: Utc::now(),
        }
    }

    pub fn failed(descriptor: HighlightDescriptor, error: CropFailure) -> Self {
        Self {
            descriptor,
            video: None,
            error: Some(error),
            completed_at: Utc::now(),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none() && self.video.is_some()
    }

    /// Convert into the record shape handed to callers.
    ///
    /// Failed jobs return their failure instead of a record.
    pub fn into_record(self, include_metadata: bool) -> Result<OutputRecord, CropFailure> {
        let video = match (self.video, self.error) {
            (Some(video), None) => video,
            (_, Some(error)) => return Err(error),
            (None, None) => {
                return Err(CropFailure::new(
                    CropFailureKind::Remote,
                    "job finished without an output video",
                ))
            }
        };

        if !include_metadata {
            return Ok(OutputRecord::Video(video));
        }

        let d = self.descriptor;
        Ok(OutputRecord::Highlight {
            title: d.title,
            score: d.score,
            start_time: d.start_time,
            end_time: d.end_time,
            video,
        })
    }
}

/// A record emitted to the caller: either the bare cropped video or the
/// video tagged with its highlight metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OutputRecord {
    Highlight {
        title: String,
        score: f64,
        start_time: f64,
        end_time: f64,
        video: CroppedVideo,
    },
    Video(CroppedVideo),
}

impl OutputRecord {
    pub fn video(&self) -> &CroppedVideo {
        match self {
            OutputRecord::Highlight { video, .. } => video,
            OutputRecord::Video(video) => video,
        }
    }
}
