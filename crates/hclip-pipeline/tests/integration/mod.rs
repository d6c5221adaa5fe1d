//! Integration tests for the highlight pipeline.
//!
//! `http_pipeline_tests` run against local mock services. The others need
//! FFmpeg on PATH or live services and are `#[ignore]`d.

pub mod ffmpeg_tests;
pub mod http_pipeline_tests;
pub mod live_service_tests;
