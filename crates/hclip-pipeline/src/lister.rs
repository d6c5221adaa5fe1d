//! Highlight listing from the detection result stream.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use hclip_models::{highlights_from_record, AnalysisSettings, HighlightDescriptor, SourceVideo};
use hclip_remote::{HighlightDetector, RecordStream};

use crate::error::{PipelineError, PipelineResult};

/// Asks the detection service for highlights and normalizes them.
pub struct HighlightLister {
    detector: Arc<dyn HighlightDetector>,
    require_highlights: bool,
}

impl HighlightLister {
    pub fn new(detector: Arc<dyn HighlightDetector>, require_highlights: bool) -> Self {
        Self {
            detector,
            require_highlights,
        }
    }

    /// Submit an analysis of `source` and return its highlights in service order.
    pub async fn list(
        &self,
        source: &SourceVideo,
        settings: &AnalysisSettings,
    ) -> PipelineResult<Vec<HighlightDescriptor>> {
        let records = self.detector.submit_analysis(source, settings).await?;
        scan_records(records, self.require_highlights).await
    }
}

/// Drain `records` until the first one carrying highlights.
///
/// The stream is dropped as soon as that record is found. A stream that ends
/// without one yields an empty list, or `HighlightsMissing` when `required`.
pub async fn scan_records(
    mut records: RecordStream,
    required: bool,
) -> PipelineResult<Vec<HighlightDescriptor>> {
    let mut scanned = 0usize;

    while let Some(record) = records.next().await {
        let record = record?;
        scanned += 1;

        if let Some(highlights) = highlights_from_record(&record) {
            let highlights = highlights?;
            debug!(
                "Found {} highlights after {} records",
                highlights.len(),
                scanned
            );
            return Ok(highlights);
        }
    }

    if required {
        return Err(PipelineError::HighlightsMissing);
    }

    warn!(
        "Detection stream ended after {} records without highlights; continuing with none",
        scanned
    );
    Ok(Vec::new())
}
