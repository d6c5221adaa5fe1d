//! Collaborator interfaces consumed by the pipeline.
//!
//! The pipeline is constructed with concrete implementations of these traits;
//! the HTTP clients in this crate are one such implementation.

use std::path::Path;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use hclip_models::{AnalysisSettings, CropJobRef, CropSettings, CroppedVideo, SourceVideo};

use crate::error::RemoteResult;

/// Lazily delivered analysis result records.
///
/// An `Err` item means the stream itself broke; no further records follow.
pub type RecordStream = BoxStream<'static, RemoteResult<Value>>;

/// Locates highlight segments in a source video.
#[async_trait]
pub trait HighlightDetector: Send + Sync {
    /// Start an analysis and return its result records in delivery order.
    async fn submit_analysis(
        &self,
        source: &SourceVideo,
        settings: &AnalysisSettings,
    ) -> RemoteResult<RecordStream>;
}

/// Reframes a clip to a target aspect ratio around the detected subject.
#[async_trait]
pub trait CropService: Send + Sync {
    /// Submit a crop job for `clip`. Returns as soon as the job is accepted.
    async fn submit(&self, clip: &Path, settings: &CropSettings) -> RemoteResult<CropJobRef>;

    /// Wait until the job reaches a terminal state.
    async fn await_job(&self, job: &CropJobRef) -> RemoteResult<CroppedVideo>;

    /// Ask the service to stop a job. Best effort; the default does nothing.
    async fn cancel(&self, _job: &CropJobRef) -> RemoteResult<()> {
        Ok(())
    }
}
