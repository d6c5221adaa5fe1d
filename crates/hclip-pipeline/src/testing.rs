//! In-memory collaborators for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::Notify;

use hclip_media::{MediaError, MediaResult, SegmentTool};
use hclip_models::{AnalysisSettings, CropJobRef, CropSettings, CroppedVideo, SourceVideo};
use hclip_remote::{CropService, HighlightDetector, RecordStream, RemoteError, RemoteResult};

/// Detector that replays a fixed list of records.
pub struct FakeDetector {
    records: Option<Vec<Value>>,
}

impl FakeDetector {
    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records: Some(records),
        }
    }

    /// A detector whose service cannot be reached.
    pub fn unreachable() -> Self {
        Self { records: None }
    }
}

#[async_trait]
impl HighlightDetector for FakeDetector {
    async fn submit_analysis(
        &self,
        _source: &SourceVideo,
        _settings: &AnalysisSettings,
    ) -> RemoteResult<RecordStream> {
        match &self.records {
            Some(records) => Ok(stream::iter(records.clone().into_iter().map(Ok)).boxed()),
            None => Err(RemoteError::ServiceUnavailable("connection refused".into())),
        }
    }
}

/// Segment tool that writes a small file, or fails for one start time.
#[derive(Default)]
pub struct FakeSegmentTool {
    fail_at: Option<f64>,
    ranges: Mutex<Vec<(f64, f64)>>,
}

impl FakeSegmentTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the cut whose range starts at `start_secs`.
    pub fn failing_at(start_secs: f64) -> Self {
        Self {
            fail_at: Some(start_secs),
            ..Self::default()
        }
    }

    /// Ranges requested so far, in call order.
    pub fn ranges(&self) -> Vec<(f64, f64)> {
        self.ranges.lock().unwrap().clone()
    }
}

#[async_trait]
impl SegmentTool for FakeSegmentTool {
    async fn cut_segment(
        &self,
        _source: &SourceVideo,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> MediaResult<()> {
        self.ranges.lock().unwrap().push((start_secs, end_secs));

        if self.fail_at == Some(start_secs) {
            return Err(MediaError::ffmpeg_failed(
                "exit status 1",
                Some("Invalid duration specification".to_string()),
                Some(1),
            ));
        }

        tokio::fs::write(output, format!("{}-{}", start_secs, end_secs)).await?;
        Ok(())
    }
}

/// A clip as seen by the crop service at submission time.
#[derive(Debug, Clone)]
pub struct Submission {
    pub clip: PathBuf,
    pub existed: bool,
}

/// Crop service whose jobs are named after the clip file and finish on demand.
///
/// Jobs without a gate finish immediately. A gated job waits until its
/// `Notify` is signalled; a gate that is never signalled holds the job forever.
#[derive(Default)]
pub struct FakeCropService {
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    delays: HashMap<String, Duration>,
    reject: HashSet<String>,
    fail: HashSet<String>,
    submitted: Mutex<Vec<Submission>>,
    cancelled: Mutex<Vec<CropJobRef>>,
}

impl FakeCropService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse submission of the clip with this file name.
    pub fn reject_submit(mut self, file_name: &str) -> Self {
        self.reject.insert(file_name.to_string());
        self
    }

    /// Make this job take `delay` of remote time before it finishes.
    pub fn delay_job(mut self, job: &str, delay: Duration) -> Self {
        self.delays.insert(job.to_string(), delay);
        self
    }

    /// Report this job as failed by the service.
    pub fn fail_job(mut self, job: &str) -> Self {
        self.fail.insert(job.to_string());
        self
    }

    /// Hold `job` until the returned handle is notified.
    pub fn gate(&self, job: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(job.to_string(), notify.clone());
        notify
    }

    pub fn submitted(&self) -> Vec<Submission> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<CropJobRef> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl CropService for FakeCropService {
    async fn submit(&self, clip: &Path, _settings: &CropSettings) -> RemoteResult<CropJobRef> {
        let file_name = clip
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.submitted.lock().unwrap().push(Submission {
            clip: clip.to_path_buf(),
            existed: clip.exists(),
        });

        if self.reject.contains(&file_name) {
            return Err(RemoteError::RequestFailed("upload rejected".into()));
        }
        Ok(CropJobRef::new(file_name))
    }

    async fn await_job(&self, job: &CropJobRef) -> RemoteResult<CroppedVideo> {
        let gate = self.gates.lock().unwrap().get(job.as_str()).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delays.get(job.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail.contains(job.as_str()) {
            return Err(RemoteError::JobFailed("no subject found".into()));
        }
        Ok(CroppedVideo::new(format!("cropped://{}", job)))
    }

    async fn cancel(&self, job: &CropJobRef) -> RemoteResult<()> {
        self.cancelled.lock().unwrap().push(job.clone());
        Ok(())
    }
}
