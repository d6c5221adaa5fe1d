//! HTTP client for the highlight detection service.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use tracing::{debug, info};

use hclip_models::{AnalysisSettings, SourceVideo};

use crate::client::{ensure_success, ServiceClient, ServiceConfig};
use crate::error::{RemoteError, RemoteResult};
use crate::ndjson::decode_ndjson;
use crate::service::{HighlightDetector, RecordStream};
use crate::types::{AnalysisRequest, UrlSource};

/// Talks to the detection service over `POST /v1/analysis`.
///
/// URL sources are sent as JSON for the service to fetch. Local files are
/// uploaded as a multipart `file` part next to a `settings` part. The response
/// body is newline-delimited JSON; records are surfaced as they arrive rather
/// than after the analysis completes.
#[derive(Debug, Clone)]
pub struct HttpHighlightDetector {
    client: ServiceClient,
}

impl HttpHighlightDetector {
    pub fn new(config: ServiceConfig) -> RemoteResult<Self> {
        Ok(Self {
            client: ServiceClient::new(config)?,
        })
    }

    /// Create from `HCLIP_DETECTION_URL` and the shared remote settings.
    pub fn from_env() -> RemoteResult<Self> {
        Self::new(ServiceConfig::from_env("HCLIP_DETECTION_URL")?)
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    async fn post_url(
        &self,
        url: &str,
        video_url: &str,
        settings: &AnalysisSettings,
    ) -> RemoteResult<Response> {
        let request = AnalysisRequest {
            source: UrlSource { url: video_url },
            settings,
        };

        self.client
            .with_retry(|| async {
                let response = self
                    .client
                    .http()
                    .post(url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(RemoteError::Network)?;
                ensure_success(response).await
            })
            .await
    }

    async fn upload_file(
        &self,
        url: &str,
        path: &Path,
        settings: &AnalysisSettings,
    ) -> RemoteResult<Response> {
        let bytes = tokio::fs::read(path).await?;
        let settings_json = serde_json::to_string(settings)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        debug!("Uploading {} ({} bytes) for analysis", file_name, bytes.len());

        self.client
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
                    .post(url)
                    .multipart(form)
                    .send()
                    .await
                    .map_err(RemoteError::Network)?;
                ensure_success(response).await
            })
            .await
    }
}

#[async_trait]
impl HighlightDetector for HttpHighlightDetector {
    async fn submit_analysis(
        &self,
        source: &SourceVideo,
        settings: &AnalysisSettings,
    ) -> RemoteResult<RecordStream> {
        let url = self.client.url("/v1/analysis");

        debug!("Submitting analysis of {} to {}", source, url);

        let response = match source.local_path() {
            Some(path) => self.upload_file(&url, path, settings).await?,
            None => {
                self.post_url(&url, &source.as_ffmpeg_input(), settings)
                    .await?
            }
        };

        info!(source = %source, "Analysis accepted, streaming records");

        Ok(decode_ndjson(response.bytes_stream()))
    }
}
