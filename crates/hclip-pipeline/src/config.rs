//! Pipeline configuration.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use validator::Validate;

use hclip_models::{AnalysisSettings, AspectRatio, CropSettings};

use crate::error::{PipelineError, PipelineResult};

/// What to do when a segment cannot be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutFailurePolicy {
    /// Fail the whole run before any crop job is submitted
    #[default]
    Abort,
    /// Log the failure and drop that highlight
    Skip,
}

impl FromStr for CutFailurePolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(CutFailurePolicy::Abort),
            "skip" => Ok(CutFailurePolicy::Skip),
            other => Err(PipelineError::config(format!(
                "unknown cut failure policy '{}' (expected abort or skip)",
                other
            ))),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent directory for per-run scratch directories
    pub work_dir: PathBuf,
    /// Behavior when cutting a segment fails
    pub on_cut_failure: CutFailurePolicy,
    /// Treat a detection stream without a highlights record as an error
    pub require_highlights: bool,
    /// Upper bound on each crop job wait
    pub crop_timeout: Duration,
    /// Upper bound on each FFmpeg cut, unbounded when unset
    pub ffmpeg_timeout_secs: Option<u64>,
    /// Results buffered ahead of the consumer
    pub result_buffer: usize,
    /// Tag output records with their highlight metadata
    pub return_highlight_metadata: bool,
    /// Settings sent with the analysis request
    pub analysis: AnalysisSettings,
    /// Settings sent with every crop job
    pub crop: CropSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            on_cut_failure: CutFailurePolicy::Abort,
            require_highlights: false,
            crop_timeout: Duration::from_secs(1800), // 30 minutes
            ffmpeg_timeout_secs: None,
            result_buffer: 8,
            return_highlight_metadata: false,
            analysis: AnalysisSettings::default(),
            crop: CropSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    ///
    /// Unset variables take their defaults; set but malformed ones are errors.
    pub fn from_env() -> PipelineResult<Self> {
        let defaults = Self::default();

        let crop = CropSettings::default()
            .with_prompts(
                std::env::var("HCLIP_AUTOCROP_PROMPT").unwrap_or_else(|_| "person".to_string()),
                std::env::var("HCLIP_AUTOCROP_NEGATIVE_PROMPT").unwrap_or_default(),
            )
            .with_aspect_ratio(
                env_parse::<AspectRatio>("HCLIP_ASPECT_RATIO")?.unwrap_or_default(),
            )
            .with_min_scene_length(env_parse("HCLIP_MIN_SCENE_LENGTH")?.unwrap_or(0));

        let config = Self {
            work_dir: PathBuf::from(
                std::env::var("HCLIP_WORK_DIR").unwrap_or_else(|_| ".".to_string()),
            ),
            on_cut_failure: env_parse("HCLIP_ON_CUT_FAILURE")?
                .unwrap_or(defaults.on_cut_failure),
            require_highlights: env_flag("HCLIP_REQUIRE_HIGHLIGHTS"),
            crop_timeout: env_parse("HCLIP_CROP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.crop_timeout),
            ffmpeg_timeout_secs: env_parse("HCLIP_FFMPEG_TIMEOUT_SECS")?,
            result_buffer: env_parse("HCLIP_RESULT_BUFFER")?.unwrap_or(defaults.result_buffer),
            return_highlight_metadata: env_flag("HCLIP_RETURN_METADATA"),
            analysis: AnalysisSettings::with_prompt(
                std::env::var("HCLIP_ANALYSIS_PROMPT").unwrap_or_default(),
            ),
            crop,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the run relies on.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.result_buffer == 0 {
            return Err(PipelineError::config("result buffer must be at least 1"));
        }
        if self.crop_timeout.is_zero() {
            return Err(PipelineError::config("crop timeout must be positive"));
        }
        if self.ffmpeg_timeout_secs == Some(0) {
            return Err(PipelineError::config("ffmpeg timeout must be positive"));
        }
        self.crop
            .validate()
            .map_err(|e| PipelineError::config(format!("invalid crop settings: {}", e)))
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_cut_failure_policy(mut self, policy: CutFailurePolicy) -> Self {
        self.on_cut_failure = policy;
        self
    }

    pub fn with_crop_timeout(mut self, timeout: Duration) -> Self {
        self.crop_timeout = timeout;
        self
    }
}

/// Parse `name` if it is set.
fn env_parse<T>(name: &str) -> PipelineResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => parse_setting(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_setting<T>(name: &str, raw: &str) -> PipelineResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| PipelineError::config(format!("{}={:?}: {}", name, raw, e)))
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
