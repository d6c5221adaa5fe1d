//! Highlight clipper binary.
//!
//! Usage: `hclip <video path or URL>`
//!
//! Prints one JSON record per cropped clip on stdout; logs go to stderr.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hclip_media::{check_tool, FfmpegRunner, FfmpegSegmentTool};
use hclip_models::SourceVideo;
use hclip_pipeline::{Pipeline, PipelineConfig};
use hclip_remote::{HttpCropService, HttpHighlightDetector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    let Some(input) = std::env::args().nth(1) else {
        eprintln!("usage: hclip <video path or URL>");
        std::process::exit(2);
    };
    let source = SourceVideo::parse(&input);

    let config = PipelineConfig::from_env().context("invalid configuration")?;
    info!("Pipeline config: {:?}", config);

    check_tool(FfmpegRunner::new().program())?;

    let detector = HttpHighlightDetector::from_env().context("failed to create detection client")?;
    let crop_service = HttpCropService::from_env().context("failed to create auto-crop client")?;
    let runner = match config.ffmpeg_timeout_secs {
        Some(secs) => FfmpegRunner::new().with_timeout(secs),
        None => FfmpegRunner::new(),
    };
    let segment_tool = FfmpegSegmentTool::new(runner);

    let pipeline = Pipeline::new(
        config,
        Arc::new(detector),
        Arc::new(segment_tool),
        Arc::new(crop_service),
    );

    let mut stream = pipeline.start(source);
    info!(run_id = %stream.run_id(), "Started run for {}", input);

    let mut stdout = std::io::stdout().lock();
    let mut failed_jobs = 0usize;

    loop {
        let next = tokio::select! {
            item = stream.next_record() => Some(item),
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(item) = next else {
            info!("Received shutdown signal");
            if let Some(summary) = stream.abandon().await {
                info!(cancelled = summary.cancelled, "Run abandoned");
            }
            std::process::exit(130);
        };

        match item {
            Some(Ok(record)) => {
                serde_json::to_writer(&mut stdout, &record)?;
                writeln!(stdout)?;
                stdout.flush()?;
            }
            Some(Err(e)) if !e.is_fatal() => {
                warn!("{}", e);
                failed_jobs += 1;
            }
            Some(Err(e)) => {
                error!(stage = %e.stage(), "Run failed: {}", e);
                return Err(e.into());
            }
            None => break,
        }
    }

    if failed_jobs > 0 {
        warn!("{} crop jobs failed", failed_jobs);
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive("hclip=info".parse()?)
        .add_directive("reqwest=warn".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}
