//! HTTP client for the auto-crop service.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use hclip_models::{CropJobRef, CropSettings, CroppedVideo};

use crate::client::{ensure_success, ServiceClient, ServiceConfig};
use crate::error::{RemoteError, RemoteResult};
use crate::service::CropService;
use crate::types::{CropJobState, CropJobStatus, SubmitCropResponse};

/// Auto-crop service client.
///
/// Jobs are submitted as multipart uploads and then polled at
/// [`ServiceConfig::poll_interval`] until they finish or fail.
#[derive(Debug, Clone)]
pub struct HttpCropService {
    client: ServiceClient,
}

impl HttpCropService {
    pub fn new(config: ServiceConfig) -> RemoteResult<Self> {
        Ok(Self {
            client: ServiceClient::new(config)?,
        })
    }

    /// Create from `HCLIP_AUTOCROP_URL` and the shared remote settings.
    pub fn from_env() -> RemoteResult<Self> {
        Self::new(ServiceConfig::from_env("HCLIP_AUTOCROP_URL")?)
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Fetch the current state of a job.
    pub async fn status(&self, job: &CropJobRef) -> RemoteResult<CropJobState> {
        let url = self.client.url(&format!("/v1/autocrop/{}", job));

        let response = self
            .client
            .with_retry(|| async {
                let response = self
                    .client
                    .http()
                    .get(&url)
                    .send()
                    .await
                    .map_err(RemoteError::Network)?;
                ensure_success(response).await
            })
            .await?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CropService for HttpCropService {
    async fn submit(&self, clip: &Path, settings: &CropSettings) -> RemoteResult<CropJobRef> {
        let url = self.client.url("/v1/autocrop");
        let bytes = tokio::fs::read(clip).await?;
        let settings_json = serde_json::to_string(settings)?;
        let file_name = clip
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip.mp4".to_string());

        debug!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), url);

        // Forms are consumed on send, so each attempt builds its own.
        let response = self
            .client
            .with_retry(|| async {
                let file = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str("video/mp4")?;
                let form = Form::new()
                    .part("file", file)
                    .text("settings", settings_json.clone());

                let response = self
                    .client
                    .http()
                    .post(&url)
                    .multipart(form)
                    .send()
                    .await
                    .map_err(RemoteError::Network)?;
                ensure_success(response).await
            })
            .await?;

        let submitted: SubmitCropResponse = response.json().await?;
        if submitted.job_id.is_empty() {
            return Err(RemoteError::InvalidResponse(
                "crop service returned an empty job id".to_string(),
            ));
        }

        info!(job_id = %submitted.job_id, clip = %file_name, "Crop job submitted");
        Ok(CropJobRef::new(submitted.job_id))
    }

    async fn await_job(&self, job: &CropJobRef) -> RemoteResult<CroppedVideo> {
        loop {
            let state = self.status(job).await?;
            if !state.status.is_terminal() {
                tokio::time::sleep(self.client.config().poll_interval).await;
                continue;
            }

            match state.status {
                CropJobStatus::Finished => {
                    let location = state.output_url.ok_or_else(|| {
                        RemoteError::InvalidResponse(format!(
                            "job {} finished without an output_url",
                            job
                        ))
                    })?;
                    debug!(job_id = %job, "Crop job finished");
                    return Ok(CroppedVideo::new(location));
                }
                _ => {
                    return Err(RemoteError::JobFailed(
                        state
                            .error
                            .unwrap_or_else(|| "crop service reported an error".to_string()),
                    ));
                }
            }
        }
    }

    async fn cancel(&self, job: &CropJobRef) -> RemoteResult<()> {
        let url = self.client.url(&format!("/v1/autocrop/{}", job));

        let response = self
            .client
            .http()
            .delete(&url)
            .send()
            .await
            .map_err(RemoteError::Network)?;

        // Already gone counts as cancelled.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        if let Err(e) = ensure_success(response).await {
            warn!(job_id = %job, "Crop job cancel rejected: {}", e);
            return Err(e);
        }
        Ok(())
    }
}
