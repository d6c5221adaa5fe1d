//! Segment extraction against a real FFmpeg binary.

use hclip_media::{
    extract_segment, FfmpegCommand, FfmpegRunner, FfmpegSegmentTool, MediaError, SegmentTool,
};
use hclip_models::SourceVideo;
use tempfile::TempDir;

/// Render a short synthetic test video.
async fn make_source(dir: &TempDir) -> std::path::PathBuf {
    let source = dir.path().join("source.mp4");
    let lavfi_input = "testsrc=duration=6:size=320x240:rate=25";
    let cmd = FfmpegCommand::new(lavfi_input, source.to_string_lossy())
        .input_arg("-f")
        .input_arg("lavfi")
        .output_arg("-pix_fmt")
        .output_arg("yuv420p");

    FfmpegRunner::new()
        .run(&cmd)
        .await
        .expect("Failed to render test source");
    source
}

#[tokio::test]
#[ignore = "requires ffmpeg on PATH"]
async fn test_extract_segment_copies_range() {
    let dir = TempDir::new().unwrap();
    let source = SourceVideo::Path(make_source(&dir).await);
    let output = dir.path().join("intro_highlight.mp4");

    extract_segment(&FfmpegRunner::new(), &source, &output, 1.0, 3.0)
        .await
        .expect("Failed to extract segment");

    let size = std::fs::metadata(&output).unwrap().len();
    println!("Extracted segment: {} bytes", size);
    assert!(size > 0);
}

#[tokio::test]
#[ignore = "requires ffmpeg on PATH"]
async fn test_missing_source_is_tool_failure() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("never_highlight.mp4");

    let err = FfmpegSegmentTool::default()
        .cut_segment(
            &SourceVideo::Path(dir.path().join("missing.mp4")),
            0.0,
            1.0,
            &output,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::FfmpegFailed { .. }));
    assert!(!output.exists());
}
