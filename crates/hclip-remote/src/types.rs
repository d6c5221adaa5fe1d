//! Wire types for the remote services.

use serde::{Deserialize, Serialize};

use hclip_models::AnalysisSettings;

/// JSON body of `POST /v1/analysis` for a video the service fetches itself.
///
/// Local files are uploaded as multipart instead.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest<'a> {
    pub source: UrlSource<'a>,
    pub settings: &'a AnalysisSettings,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UrlSource<'a> {
    pub url: &'a str,
}

/// Response to `POST /v1/autocrop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitCropResponse {
    pub job_id: String,
}

/// Lifecycle state of a crop job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropJobStatus {
    Queued,
    Processing,
    Finished,
    Error,
}

impl CropJobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CropJobStatus::Finished | CropJobStatus::Error)
    }
}

/// Response to `GET /v1/autocrop/{job_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropJobState {
    pub status: CropJobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}
