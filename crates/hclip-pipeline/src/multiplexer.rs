//! Completion-order fan-in over outstanding crop jobs.
//!
//! Each wait runs as its own task, so a job keeps making progress (and its
//! timeout keeps counting against the job alone) while the consumer is busy.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::AbortHandle;
use tracing::{debug, error, warn};

use hclip_models::{CropFailure, CropFailureKind, CropJobRef, CroppedResult, HighlightDescriptor};
use hclip_remote::CropService;

use crate::dispatcher::CropJobHandle;
use crate::metrics;

/// Waits on all crop jobs at once and yields each result as it lands.
pub struct CompletionMultiplexer {
    service: Arc<dyn CropService>,
    timeout: Duration,
}

impl CompletionMultiplexer {
    pub fn new(service: Arc<dyn CropService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Start waiting on every handle.
    pub fn start(&self, handles: Vec<CropJobHandle>) -> Completions {
        let pending = FuturesUnordered::new();
        let mut outstanding = HashMap::new();

        for (index, handle) in handles.into_iter().enumerate() {
            match handle.job {
                Ok(job) => {
                    let descriptor = handle.descriptor.clone();
                    let task = tokio::spawn(wait_for_job(
                        index,
                        self.service.clone(),
                        job.clone(),
                        handle.descriptor,
                        self.timeout,
                    ));
                    outstanding.insert(index, (job, task.abort_handle()));
                    pending.push(Box::pin(async move {
                        match task.await {
                            Ok(done) => done,
                            Err(e) => {
                                error!(title = %descriptor.title, "Crop wait task failed: {}", e);
                                let failure = CropFailure::new(
                                    CropFailureKind::Remote,
                                    format!("crop wait task failed: {}", e),
                                );
                                (index, CroppedResult::failed(descriptor, failure))
                            }
                        }
                    }) as BoxFuture<'static, _>);
                }
                Err(failure) => {
                    let result = CroppedResult::failed(handle.descriptor, failure);
                    pending.push(Box::pin(async move { (index, result) }) as BoxFuture<'static, _>);
                }
            }
        }

        Completions {
            service: self.service.clone(),
            pending,
            outstanding,
        }
    }
}

/// Results of a set of crop jobs, in completion order.
///
/// Every handle passed to [`CompletionMultiplexer::start`] produces exactly one
/// result.
pub struct Completions {
    service: Arc<dyn CropService>,
    pending: FuturesUnordered<BoxFuture<'static, (usize, CroppedResult)>>,
    outstanding: HashMap<usize, (CropJobRef, AbortHandle)>,
}

impl Completions {
    /// Next finished job, or `None` once every job has reported.
    ///
    /// Cancel safe: dropping the returned future loses no result.
    pub async fn next(&mut self) -> Option<CroppedResult> {
        let (index, result) = self.pending.next().await?;
        self.outstanding.remove(&index);
        Some(result)
    }

    /// Jobs that have not reported yet.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Stop waiting and ask the service to cancel every job still running.
    ///
    /// Returns the number of jobs a cancel was sent for. Jobs whose wait
    /// already finished are not cancelled. Cancel errors are logged only.
    pub async fn cancel_outstanding(mut self) -> usize {
        let outstanding = std::mem::take(&mut self.outstanding);

        let mut count = 0;
        for (job, task) in outstanding.into_values() {
            if task.is_finished() {
                continue;
            }
            task.abort();
            count += 1;
            match self.service.cancel(&job).await {
                Ok(()) => debug!(job_ref = %job, "Cancelled crop job"),
                Err(e) => warn!(job_ref = %job, "Failed to cancel crop job: {}", e),
            }
        }
        count
    }
}

impl Drop for Completions {
    fn drop(&mut self) {
        for (_, task) in self.outstanding.values() {
            task.abort();
        }
    }
}

fn wait_for_job(
    index: usize,
    service: Arc<dyn CropService>,
    job: CropJobRef,
    descriptor: HighlightDescriptor,
    timeout: Duration,
) -> BoxFuture<'static, (usize, CroppedResult)> {
    Box::pin(async move {
        let started = Instant::now();

        let result = match tokio::time::timeout(timeout, service.await_job(&job)).await {
            Ok(Ok(video)) => CroppedResult::succeeded(descriptor, video),
            Ok(Err(e)) => CroppedResult::failed(
                descriptor,
                CropFailure::new(CropFailureKind::Remote, e.to_string()),
            ),
            Err(_) => {
                // The remote job may still be running.
                if let Err(e) = service.cancel(&job).await {
                    warn!(job_ref = %job, "Failed to cancel timed out crop job: {}", e);
                }
                CroppedResult::failed(
                    descriptor,
                    CropFailure::new(
                        CropFailureKind::Timeout,
                        format!(
                            "crop job {} did not finish within {}s",
                            job,
                            timeout.as_secs_f64()
                        ),
                    ),
                )
            }
        };

        let outcome = match &result.error {
            None => "success",
            Some(failure) => failure.kind.as_str(),
        };
        metrics::record_crop_job(outcome, started.elapsed().as_secs_f64());
        debug!(
            job_ref = %job,
            title = %result.descriptor.title,
            outcome,
            "Crop job finished"
        );

        (index, result)
    })
}
