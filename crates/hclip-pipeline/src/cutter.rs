//! Segment cutting into the run's scratch directory.

use std::sync::Arc;

use tracing::{info, warn};

use hclip_media::SegmentTool;
use hclip_models::{ClipNamer, HighlightDescriptor, SourceVideo};

use crate::config::CutFailurePolicy;
use crate::error::{PipelineError, PipelineResult};
use crate::metrics;
use crate::scratch::ScratchSpace;

/// Clips produced by [`SegmentCutter::cut_all`].
#[derive(Debug, Default)]
pub struct CutClips {
    /// Descriptors with `source_clip_path` set, in detection order
    pub clips: Vec<HighlightDescriptor>,
    /// Highlights dropped under [`CutFailurePolicy::Skip`]
    pub skipped: usize,
}

/// Materializes highlight segments as clip files, one at a time.
pub struct SegmentCutter {
    tool: Arc<dyn SegmentTool>,
    namer: ClipNamer,
}

impl SegmentCutter {
    pub fn new(tool: Arc<dyn SegmentTool>) -> Self {
        Self {
            tool,
            namer: ClipNamer::new(),
        }
    }

    /// Cut one highlight into `scratch` and bind the descriptor to the file.
    ///
    /// The filename is reserved even when the cut fails, so names stay stable
    /// for the rest of the run.
    pub async fn cut(
        &mut self,
        source: &SourceVideo,
        descriptor: HighlightDescriptor,
        scratch: &ScratchSpace,
    ) -> PipelineResult<HighlightDescriptor> {
        let output = scratch.file_path(&self.namer.filename_for(&descriptor.title));

        let result = self
            .tool
            .cut_segment(source, descriptor.start_time, descriptor.end_time, &output)
            .await;
        metrics::record_segment_cut(result.is_ok());

        match result {
            Ok(()) => Ok(descriptor.with_clip_path(output)),
            Err(e) => Err(PipelineError::segment_cut(descriptor.title, e)),
        }
    }

    /// Cut every highlight in order, applying `policy` to failures.
    pub async fn cut_all(
        &mut self,
        source: &SourceVideo,
        descriptors: Vec<HighlightDescriptor>,
        scratch: &ScratchSpace,
        policy: CutFailurePolicy,
    ) -> PipelineResult<CutClips> {
        let mut out = CutClips::default();

        for descriptor in descriptors {
            match self.cut(source, descriptor, scratch).await {
                Ok(clip) => {
                    info!(
                        title = %clip.title,
                        start = clip.start_time,
                        end = clip.end_time,
                        duration = clip.duration(),
                        "Cut highlight segment"
                    );
                    out.clips.push(clip);
                }
                Err(e) if policy == CutFailurePolicy::Skip => {
                    warn!("Skipping highlight: {}", e);
                    out.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(out)
    }
}
