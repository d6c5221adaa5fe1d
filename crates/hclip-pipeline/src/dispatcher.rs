//! Crop job submission.

use std::sync::Arc;

use tracing::{info, warn};

use hclip_models::{CropFailure, CropFailureKind, CropJobRef, CropSettings, HighlightDescriptor};
use hclip_remote::CropService;

/// A submitted (or rejected) crop job bound to its highlight.
#[derive(Debug, Clone)]
pub struct CropJobHandle {
    pub descriptor: HighlightDescriptor,
    /// The remote job, or why it could not be submitted
    pub job: Result<CropJobRef, CropFailure>,
}

/// Submits one crop job per cut clip without waiting for any to finish.
pub struct JobDispatcher {
    service: Arc<dyn CropService>,
    settings: CropSettings,
}

impl JobDispatcher {
    pub fn new(service: Arc<dyn CropService>, settings: CropSettings) -> Self {
        Self { service, settings }
    }

    /// Submit a job for a single clip.
    ///
    /// A submission error is kept on the handle; it is reported later as a
    /// failed result for that highlight only.
    pub async fn submit(&self, descriptor: HighlightDescriptor) -> CropJobHandle {
        let job = match descriptor.source_clip_path.as_deref() {
            Some(clip) => self
                .service
                .submit(clip, &self.settings)
                .await
                .map_err(|e| CropFailure::new(CropFailureKind::Submission, e.to_string())),
            None => Err(CropFailure::new(
                CropFailureKind::Submission,
                "highlight has no cut clip",
            )),
        };

        match &job {
            Ok(job_ref) => {
                info!(title = %descriptor.title, job_ref = %job_ref, "Submitted crop job")
            }
            Err(failure) => warn!(
                title = %descriptor.title,
                "Crop job submission failed: {}", failure.message
            ),
        }

        CropJobHandle { descriptor, job }
    }

    /// Submit jobs for all clips, in order.
    pub async fn dispatch(&self, clips: Vec<HighlightDescriptor>) -> Vec<CropJobHandle> {
        let mut handles = Vec::with_capacity(clips.len());
        for clip in clips {
            handles.push(self.submit(clip).await);
        }
        handles
    }
}
