//! End-to-end runs against mock detection and auto-crop services.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hclip_media::{MediaResult, SegmentTool};
use hclip_models::{OutputRecord, SourceVideo};
use hclip_pipeline::{Pipeline, PipelineConfig, PipelineError};
use hclip_remote::{HttpCropService, HttpHighlightDetector, ServiceConfig};

/// Writes placeholder clip files instead of running FFmpeg.
struct PlaceholderCutter;

#[async_trait]
impl SegmentTool for PlaceholderCutter {
    async fn cut_segment(
        &self,
        _source: &SourceVideo,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> MediaResult<()> {
        tokio::fs::write(output, format!("segment {}-{}", start_secs, end_secs)).await?;
        Ok(())
    }
}

fn service_config(server: &MockServer) -> ServiceConfig {
    ServiceConfig::default()
        .with_base_url(server.uri())
        .with_poll_interval(Duration::from_millis(20))
}

async fn mount_detection(server: &MockServer) {
    let body = concat!(
        "{\"status\":\"transcribing\"}\n",
        "{\"highlights\":[",
        "{\"title\":\"Intro\",\"score\":0.9,\"start_time\":0,\"end_time\":10},",
        "{\"title\":\"Climax\",\"score\":0.99,\"start_time\":40,\"end_time\":55}",
        "]}\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/analysis"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(server)
        .await;
}

async fn mount_submit(server: &MockServer, clip: &str, job_id: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/autocrop"))
        .and(body_string_contains(clip))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": job_id })))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, job_id: &str, polls_before_done: u64) {
    let job_path = format!("/v1/autocrop/{}", job_id);
    if polls_before_done > 0 {
        Mock::given(method("GET"))
            .and(path(job_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
            .up_to_n_times(polls_before_done)
            .with_priority(1)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "finished",
            "output_url": format!("https://cdn.test/{}.mp4", job_id)
        })))
        .mount(server)
        .await;
}

fn build_pipeline(work_dir: &Path, detection: &MockServer, autocrop: &MockServer) -> Pipeline {
    let mut config = PipelineConfig::default().with_work_dir(work_dir);
    config.return_highlight_metadata = true;

    Pipeline::new(
        config,
        Arc::new(HttpHighlightDetector::new(service_config(detection)).unwrap()),
        Arc::new(PlaceholderCutter),
        Arc::new(HttpCropService::new(service_config(autocrop)).unwrap()),
    )
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

#[tokio::test]
async fn test_end_to_end_streams_in_completion_order() {
    let detection = MockServer::start().await;
    let autocrop = MockServer::start().await;
    mount_detection(&detection).await;
    mount_submit(&autocrop, "intro_highlight.mp4", "intro").await;
    mount_submit(&autocrop, "climax_highlight.mp4", "climax").await;
    mount_status(&autocrop, "intro", 5).await;
    mount_status(&autocrop, "climax", 0).await;

    let work = TempDir::new().unwrap();
    let pipeline = build_pipeline(work.path(), &detection, &autocrop);

    let mut stream = pipeline.start(SourceVideo::parse("https://videos.test/talk.mp4"));
    let mut records = Vec::new();
    while let Some(record) = stream.next_record().await {
        records.push(record.unwrap());
    }

    assert_eq!(
        records,
        vec![
            OutputRecord::Highlight {
                title: "Climax".into(),
                score: 0.99,
                start_time: 40.0,
                end_time: 55.0,
                video: hclip_models::CroppedVideo::new("https://cdn.test/climax.mp4"),
            },
            OutputRecord::Highlight {
                title: "Intro".into(),
                score: 0.9,
                start_time: 0.0,
                end_time: 10.0,
                video: hclip_models::CroppedVideo::new("https://cdn.test/intro.mp4"),
            },
        ]
    );
    assert!(is_empty_dir(work.path()));

    let uploads = autocrop
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(uploads, 2);
}

#[tokio::test]
async fn test_failed_remote_job_does_not_stop_the_run() {
    let detection = MockServer::start().await;
    let autocrop = MockServer::start().await;
    mount_detection(&detection).await;
    mount_submit(&autocrop, "intro_highlight.mp4", "intro").await;
    mount_submit(&autocrop, "climax_highlight.mp4", "climax").await;
    mount_status(&autocrop, "intro", 0).await;
    Mock::given(method("GET"))
        .and(path("/v1/autocrop/climax"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "error": "no face detected"
        })))
        .mount(&autocrop)
        .await;

    let work = TempDir::new().unwrap();
    let pipeline = build_pipeline(work.path(), &detection, &autocrop);

    let mut stream = pipeline.start(SourceVideo::parse("https://videos.test/talk.mp4"));
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    while let Some(record) = stream.next_record().await {
        match record {
            Ok(record) => ok.push(record),
            Err(PipelineError::Crop { title, failure }) => failed.push((title, failure.message)),
            Err(other) => panic!("unexpected fatal error: {other}"),
        }
    }

    assert_eq!(ok.len(), 1);
    assert_eq!(ok[0].video().location, "https://cdn.test/intro.mp4");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "Climax");
    assert!(failed[0].1.contains("no face detected"));
    assert!(is_empty_dir(work.path()));
}

#[tokio::test]
async fn test_detection_outage_fails_run_at_detection_stage() {
    let detection = MockServer::start().await;
    let autocrop = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/analysis"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unsupported source"))
        .mount(&detection)
        .await;

    let work = TempDir::new().unwrap();
    let pipeline = build_pipeline(work.path(), &detection, &autocrop);

    let mut stream = pipeline.start(SourceVideo::parse("https://videos.test/talk.mp4"));
    let err = stream.next().await.unwrap().unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.stage(), hclip_pipeline::Stage::Detection);
    assert!(stream.next().await.is_none());
    assert!(autocrop.received_requests().await.unwrap().is_empty());
    assert!(is_empty_dir(work.path()));
}
