//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is left to
//! the embedding application.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_TOTAL: &str = "hclip_runs_total";
    pub const SEGMENTS_CUT_TOTAL: &str = "hclip_segments_cut_total";
    pub const CROP_JOBS_TOTAL: &str = "hclip_crop_jobs_total";
    pub const CROP_JOB_SECONDS: &str = "hclip_crop_job_seconds";
    pub const SCRATCH_CLEANUP_FAILURES_TOTAL: &str = "hclip_scratch_cleanup_failures_total";
}

/// Record a finished run.
pub fn record_run(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::RUNS_TOTAL, &labels).increment(1);
}

/// Record one segment cut attempt.
pub fn record_segment_cut(success: bool) {
    let labels = [("outcome", outcome_label(success).to_string())];
    counter!(names::SEGMENTS_CUT_TOTAL, &labels).increment(1);
}

/// Record a crop job reaching a terminal state.
pub fn record_crop_job(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::CROP_JOBS_TOTAL, &labels).increment(1);
    histogram!(names::CROP_JOB_SECONDS, &labels).record(duration_secs);
}

pub fn record_scratch_cleanup_failure() {
    counter!(names::SCRATCH_CLEANUP_FAILURES_TOTAL).increment(1);
}

fn outcome_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
