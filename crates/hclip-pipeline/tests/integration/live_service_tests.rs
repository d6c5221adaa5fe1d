//! Tests against deployed detection and auto-crop services.
//!
//! Configure with `HCLIP_DETECTION_URL`, `HCLIP_AUTOCROP_URL` and
//! `HCLIP_TEST_VIDEO` (a path or URL both FFmpeg and the services can read).

use std::sync::Arc;

use hclip_media::FfmpegSegmentTool;
use hclip_models::SourceVideo;
use hclip_pipeline::{Pipeline, PipelineConfig};
use hclip_remote::{HttpCropService, HttpHighlightDetector};

/// Test connectivity to both services.
#[tokio::test]
#[ignore = "requires detection and auto-crop services"]
async fn test_service_health() {
    dotenvy::dotenv().ok();

    let detector = HttpHighlightDetector::from_env().expect("Failed to create detection client");
    let crop = HttpCropService::from_env().expect("Failed to create auto-crop client");

    assert!(detector.client().health_check().await.unwrap());
    assert!(crop.client().health_check().await.unwrap());
}

/// Run the full pipeline on a real video.
#[tokio::test]
#[ignore = "requires detection and auto-crop services and ffmpeg"]
async fn test_full_run() {
    dotenvy::dotenv().ok();

    let video = std::env::var("HCLIP_TEST_VIDEO").expect("HCLIP_TEST_VIDEO not set");
    let work = tempfile::TempDir::new().unwrap();
    let config = PipelineConfig::from_env()
        .expect("Invalid configuration")
        .with_work_dir(work.path());

    let pipeline = Pipeline::new(
        config,
        Arc::new(HttpHighlightDetector::from_env().unwrap()),
        Arc::new(FfmpegSegmentTool::default()),
        Arc::new(HttpCropService::from_env().unwrap()),
    );

    let mut stream = pipeline.start(SourceVideo::parse(&video));
    let mut count = 0;
    while let Some(record) = stream.next_record().await {
        match record {
            Ok(record) => {
                println!("{}", serde_json::to_string(&record).unwrap());
                count += 1;
            }
            Err(e) if !e.is_fatal() => println!("job failed: {}", e),
            Err(e) => panic!("run failed: {}", e),
        }
    }

    println!("{} clips cropped", count);
    assert!(std::fs::read_dir(work.path()).unwrap().next().is_none());
}
