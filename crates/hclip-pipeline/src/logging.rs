//! Structured run logging utilities.
//!
//! Every lifecycle event of a run is logged with its run id and stage so a
//! single run can be followed through interleaved output.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn, Span};

use hclip_models::RunId;

use crate::error::Stage;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Highlights returned by detection
    pub highlights: usize,
    /// Segments cut to disk
    pub cut: usize,
    /// Segments dropped under the skip policy
    pub skipped: usize,
    /// Crop jobs submitted (including failed submissions)
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Jobs cancelled because the consumer went away
    pub cancelled: usize,
    /// Whether the consumer stopped reading before the end
    pub abandoned: bool,
    /// Stage of the fatal error that ended the run, if any
    pub failed_stage: Option<Stage>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    /// Wall-clock run time, once the run has finished.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    pub fn outcome(&self) -> &'static str {
        if self.failed_stage.is_some() {
            "failed"
        } else if self.abandoned {
            "abandoned"
        } else {
            "completed"
        }
    }
}

/// Run logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    source: String,
}

impl RunLogger {
    /// Create a new logger for a run over `source`.
    pub fn new(run_id: &RunId, source: impl Into<String>) -> Self {
        Self {
            run_id: run_id.to_string(),
            source: source.into(),
        }
    }

    pub fn log_start(&self) {
        info!(run_id = %self.run_id, source = %self.source, "Run started");
    }

    /// Log progress within a stage.
    pub fn log_progress(&self, stage: Stage, message: &str) {
        info!(run_id = %self.run_id, stage = %stage, "{}", message);
    }

    pub fn log_warning(&self, stage: Stage, message: &str) {
        warn!(run_id = %self.run_id, stage = %stage, "{}", message);
    }

    pub fn log_error(&self, stage: Stage, message: &str) {
        error!(run_id = %self.run_id, stage = %stage, "Run failed: {}", message);
    }

    /// Log the end-of-run counts.
    pub fn log_summary(&self, summary: &RunSummary) {
        info!(
            run_id = %self.run_id,
            outcome = summary.outcome(),
            highlights = summary.highlights,
            cut = summary.cut,
            skipped = summary.skipped,
            submitted = summary.submitted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            elapsed_secs = summary.elapsed_secs().unwrap_or_default(),
            "Run finished"
        );
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, source = %self.source)
    }
}
