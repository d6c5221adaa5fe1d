//! FFmpeg CLI wrapper for lossless segment extraction.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - A process runner with timeout and kill-on-drop cancellation
//! - The [`SegmentTool`] seam used by the pipeline to cut highlight clips

pub mod command;
pub mod error;
pub mod segment;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use segment::{extract_segment, FfmpegSegmentTool, SegmentTool};

/// Check that an executable is available in PATH.
pub fn check_tool(program: &str) -> MediaResult<std::path::PathBuf> {
    which::which(program).map_err(|_| MediaError::ToolNotFound(program.to_string()))
}
