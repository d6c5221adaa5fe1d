//! Lossless segment extraction.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use hclip_models::SourceVideo;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Cuts a time range out of a source video into its own file.
#[async_trait]
pub trait SegmentTool: Send + Sync {
    /// Write `[start_secs, end_secs)` of `source` to `output`.
    ///
    /// The range is not validated here; an invalid range surfaces as the
    /// tool's own failure.
    async fn cut_segment(
        &self,
        source: &SourceVideo,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> MediaResult<()>;
}

/// [`SegmentTool`] backed by the FFmpeg CLI with stream copy.
#[derive(Debug, Clone, Default)]
pub struct FfmpegSegmentTool {
    runner: FfmpegRunner,
}

impl FfmpegSegmentTool {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl SegmentTool for FfmpegSegmentTool {
    async fn cut_segment(
        &self,
        source: &SourceVideo,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> MediaResult<()> {
        extract_segment(&self.runner, source, output, start_secs, end_secs).await
    }
}

/// Extract a segment from a video without re-encoding.
pub async fn extract_segment(
    runner: &FfmpegRunner,
    source: &SourceVideo,
    output: &Path,
    start_secs: f64,
    end_secs: f64,
) -> MediaResult<()> {
    info!(
        "Extracting segment: {} -> {} ({:.2}s - {:.2}s)",
        source,
        output.display(),
        start_secs,
        end_secs
    );

    let cmd = FfmpegCommand::new(source.as_ffmpeg_input(), output.to_string_lossy())
        .seek(start_secs)
        .until(end_secs)
        .codec_copy(); // Fast copy without re-encoding

    runner.run(&cmd).await?;

    if !output.exists() {
        return Err(MediaError::MissingOutput(output.to_path_buf()));
    }

    info!("Segment extracted: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FfmpegSegmentTool::new(FfmpegRunner::new().with_program("false"));

        let err = tool
            .cut_segment(
                &SourceVideo::parse("source.mp4"),
                0.0,
                10.0,
                &dir.path().join("intro_highlight.mp4"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::FfmpegFailed { exit_code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_output_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("intro_highlight.mp4");
        let tool = FfmpegSegmentTool::new(FfmpegRunner::new().with_program("true"));

        let err = tool
            .cut_segment(&SourceVideo::parse("source.mp4"), 0.0, 10.0, &output)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::MissingOutput(p) if p == output));
    }
}
