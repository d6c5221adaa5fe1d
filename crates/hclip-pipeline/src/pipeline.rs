//! Run orchestration.
//!
//! Each run is driven by one producer task:
//! 1. Create the scratch directory
//! 2. List highlights from the detection stream
//! 3. Cut every highlight into the scratch directory, in order
//! 4. Submit one crop job per clip
//! 5. Forward crop results to the caller as they complete
//! 6. Remove the scratch directory, then close the result channel

use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::Instrument;

use hclip_media::SegmentTool;
use hclip_models::{CroppedResult, RunId, SourceVideo};
use hclip_remote::{CropService, HighlightDetector};

use crate::config::PipelineConfig;
use crate::cutter::{CutClips, SegmentCutter};
use crate::dispatcher::JobDispatcher;
use crate::error::{PipelineError, PipelineResult, Stage};
use crate::lister::HighlightLister;
use crate::logging::{RunLogger, RunSummary};
use crate::metrics;
use crate::multiplexer::{CompletionMultiplexer, Completions};
use crate::scratch::ScratchSpace;
use crate::stream::{ResultStream, RunItem};

/// Turns long-form videos into streams of cropped highlight clips.
///
/// Collaborators are injected at construction; the pipeline itself holds no
/// per-run state, so one instance can start any number of concurrent runs.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    detector: Arc<dyn HighlightDetector>,
    segment_tool: Arc<dyn SegmentTool>,
    crop_service: Arc<dyn CropService>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        detector: Arc<dyn HighlightDetector>,
        segment_tool: Arc<dyn SegmentTool>,
        crop_service: Arc<dyn CropService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            detector,
            segment_tool,
            crop_service,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Start a run over `source` on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; use [`Pipeline::start_on`]
    /// from synchronous code.
    pub fn start(&self, source: SourceVideo) -> ResultStream {
        self.start_on(&Handle::current(), source)
    }

    /// Start a run over `source` on the given runtime.
    pub fn start_on(&self, runtime: &Handle, source: SourceVideo) -> ResultStream {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, source.to_string());
        let (tx, rx) = mpsc::channel(self.config.result_buffer.max(1));

        let run = Run {
            logger: logger.clone(),
            config: self.config.clone(),
            detector: self.detector.clone(),
            segment_tool: self.segment_tool.clone(),
            crop_service: self.crop_service.clone(),
        };
        let producer = runtime.spawn(run.execute(source, tx).instrument(logger.create_span()));

        ResultStream::new(
            run_id,
            rx,
            producer,
            self.config.return_highlight_metadata,
        )
    }
}

/// What the forwarding loop saw next.
enum Step {
    Result(CroppedResult),
    Drained,
    Abandoned,
}

/// State owned by one run's producer task.
struct Run {
    logger: RunLogger,
    config: Arc<PipelineConfig>,
    detector: Arc<dyn HighlightDetector>,
    segment_tool: Arc<dyn SegmentTool>,
    crop_service: Arc<dyn CropService>,
}

impl Run {
    async fn execute(self, source: SourceVideo, tx: mpsc::Sender<RunItem>) -> RunSummary {
        let mut summary = RunSummary {
            started_at: Utc::now(),
            ..Default::default()
        };
        self.logger.log_start();

        // The scratch directory is gone by the time `drive` returns.
        if let Err(e) = self.drive(&source, &tx, &mut summary).await {
            let stage = e.stage();
            summary.failed_stage = Some(stage);
            self.logger.log_error(stage, &e.to_string());
            // Nobody to tell if the consumer already left.
            let _ = tx.send(Err(e)).await;
        }

        summary.finished_at = Some(Utc::now());
        self.logger.log_summary(&summary);
        metrics::record_run(summary.outcome());
        summary
    }

    async fn drive(
        &self,
        source: &SourceVideo,
        tx: &mpsc::Sender<RunItem>,
        summary: &mut RunSummary,
    ) -> PipelineResult<()> {
        let scratch =
            ScratchSpace::create(&self.config.work_dir).map_err(PipelineError::Scratch)?;
        self.logger.log_progress(
            Stage::Setup,
            &format!("Scratch directory at {}", scratch.path().display()),
        );

        let prepared = tokio::select! {
            biased;
            _ = tx.closed() => None,
            prepared = self.prepare(source, &scratch) => Some(prepared?),
        };
        let Some((highlights, cut)) = prepared else {
            summary.abandoned = true;
            self.logger
                .log_warning(Stage::Cutting, "Consumer went away before any job was submitted");
            scratch.release();
            return Ok(());
        };
        summary.highlights = highlights;
        summary.cut = cut.clips.len();
        summary.skipped = cut.skipped;

        let dispatcher = JobDispatcher::new(self.crop_service.clone(), self.config.crop.clone());
        let handles = dispatcher.dispatch(cut.clips).await;
        summary.submitted = handles.len();
        self.logger.log_progress(
            Stage::Cropping,
            &format!("Submitted {} crop jobs", handles.len()),
        );

        let multiplexer =
            CompletionMultiplexer::new(self.crop_service.clone(), self.config.crop_timeout);
        self.forward(multiplexer.start(handles), tx, summary).await;

        scratch.release();
        Ok(())
    }

    /// Detection and cutting. Returns the highlight count and the cut clips.
    async fn prepare(
        &self,
        source: &SourceVideo,
        scratch: &ScratchSpace,
    ) -> PipelineResult<(usize, CutClips)> {
        let lister = HighlightLister::new(self.detector.clone(), self.config.require_highlights);
        let highlights = lister.list(source, &self.config.analysis).await?;
        let count = highlights.len();
        self.logger
            .log_progress(Stage::Detection, &format!("Found {} highlights", count));

        let mut cutter = SegmentCutter::new(self.segment_tool.clone());
        let cut = cutter
            .cut_all(source, highlights, scratch, self.config.on_cut_failure)
            .await?;

        if cut.skipped > 0 {
            self.logger.log_warning(
                Stage::Cutting,
                &format!("Skipped {} highlights that failed to cut", cut.skipped),
            );
        }
        Ok((count, cut))
    }

    /// Send results on in completion order until every job reported or the
    /// consumer went away.
    async fn forward(
        &self,
        mut completions: Completions,
        tx: &mpsc::Sender<RunItem>,
        summary: &mut RunSummary,
    ) {
        loop {
            let step = tokio::select! {
                biased;
                _ = tx.closed() => Step::Abandoned,
                next = completions.next() => match next {
                    Some(result) => Step::Result(result),
                    None => Step::Drained,
                },
            };

            match step {
                Step::Result(result) => {
                    if result.success() {
                        summary.succeeded += 1;
                    } else {
                        summary.failed += 1;
                    }
                    if tx.send(Ok(result)).await.is_err() {
                        summary.abandoned = true;
                        break;
                    }
                }
                Step::Drained => return,
                Step::Abandoned => {
                    summary.abandoned = true;
                    break;
                }
            }
        }

        let remaining = completions.remaining();
        summary.cancelled = completions.cancel_outstanding().await;
        self.logger.log_warning(
            Stage::Cropping,
            &format!(
                "Consumer went away with {} jobs outstanding; cancelled {}",
                remaining, summary.cancelled
            ),
        );
    }
}
