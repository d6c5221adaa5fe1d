//! Request settings sent to the remote analysis and auto-crop services.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AspectRatio;

/// Settings for a highlight analysis request.
///
/// Only highlight generation is enabled; the remaining generators are sent
/// explicitly disabled because the service defaults them on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisSettings {
    pub transcription_backend: String,
    pub llm_backend: String,
    /// Custom prompt guiding the analysis
    pub prompt: String,
    pub generate_summary: bool,
    pub generate_title: bool,
    pub generate_tags: bool,
    pub generate_chapters: bool,
    pub generate_highlights: bool,
    pub generate_sentiments: bool,
    pub custom_chapters: Vec<String>,
    pub custom_chapter_mode: String,
    pub max_summary_length: u32,
    pub max_title_length: u32,
    pub num_tags: u32,
    pub target_language: String,
    pub speaker_diarization: bool,
    pub use_vad: bool,
    pub denoise_audio: bool,
    pub return_as_json_file: bool,
    pub min_chapter_length: u32,
    pub use_azure: bool,
    pub custom_vocabulary: HashMap<String, String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            transcription_backend: "groq-whisper".to_string(),
            llm_backend: "gpt-4o-2024-08-06".to_string(),
            prompt: String::new(),
            generate_summary: false,
            generate_title: false,
            generate_tags: false,
            generate_chapters: false,
            generate_highlights: true,
            generate_sentiments: false,
            custom_chapters: Vec::new(),
            custom_chapter_mode: "extended".to_string(),
            max_summary_length: 5,
            max_title_length: 10,
            num_tags: 5,
            target_language: String::new(),
            speaker_diarization: false,
            use_vad: false,
            denoise_audio: false,
            return_as_json_file: false,
            min_chapter_length: 0,
            use_azure: false,
            custom_vocabulary: HashMap::new(),
        }
    }
}

impl AnalysisSettings {
    /// Default settings with a custom analysis prompt.
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Settings for one auto-crop job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CropSettings {
    /// Keep the active speaker in frame
    pub active_speaker_detection: bool,
    pub return_video: bool,
    /// Crop window start within the clip (seconds)
    pub start_time: f64,
    /// Crop window end within the clip (seconds, -1 = end of clip)
    pub end_time: f64,
    pub speed_boost: bool,
    pub smart_edit: bool,
    pub visualize: bool,
    pub include_subjects: bool,
    pub include_non_active_layouts: bool,
    pub single_crop_only: bool,
    #[validate(range(min = 0.0, max = 1.0))]
    pub crop_movement_speed: f64,
    #[validate(range(min = 1))]
    pub crop_sampling_interval: u32,
    pub return_scene_data: bool,
    /// Primary subject to keep in frame
    #[validate(length(max = 500))]
    pub prompt: String,
    /// Elements to avoid focusing on
    #[validate(length(max = 500))]
    pub negative_prompt: String,
    /// Minimum scene duration in seconds
    pub min_scene_length: u32,
    pub aspect_ratio: AspectRatio,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            active_speaker_detection: true,
            return_video: true,
            start_time: 0.0,
            end_time: -1.0,
            speed_boost: false,
            smart_edit: false,
            visualize: false,
            include_subjects: false,
            include_non_active_layouts: false,
            single_crop_only: false,
            crop_movement_speed: 0.1,
            crop_sampling_interval: 3,
            return_scene_data: false,
            prompt: "person".to_string(),
            negative_prompt: String::new(),
            min_scene_length: 0,
            aspect_ratio: AspectRatio::default(),
        }
    }
}

impl CropSettings {
    pub fn with_prompts(
        mut self,
        prompt: impl Into<String>,
        negative_prompt: impl Into<String>,
    ) -> Self {
        self.prompt = prompt.into();
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_min_scene_length(mut self, seconds: u32) -> Self {
        self.min_scene_length = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_defaults_only_generate_highlights() {
        let settings = AnalysisSettings::with_prompt("find jokes");
        assert!(settings.generate_highlights);
        assert!(!settings.generate_summary);
        assert!(!settings.generate_chapters);
        assert_eq!(settings.prompt, "find jokes");
        assert_eq!(settings.transcription_backend, "groq-whisper");
    }

    #[test]
    fn test_crop_defaults() {
        let settings = CropSettings::default();
        assert!(settings.active_speaker_detection);
        assert_eq!(settings.end_time, -1.0);
        assert_eq!(settings.aspect_ratio, AspectRatio::PORTRAIT);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_crop_settings_serialize_aspect_as_string() {
        let settings = CropSettings::default().with_aspect_ratio(AspectRatio::SQUARE);
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["aspect_ratio"], "1:1");
        assert_eq!(json["prompt"], "person");
    }

    #[test]
    fn test_crop_settings_validation() {
        let mut settings = CropSettings::default();
        settings.crop_movement_speed = 1.5;
        assert!(settings.validate().is_err());

        let mut settings = CropSettings::default();
        settings.crop_sampling_interval = 0;
        assert!(settings.validate().is_err());
    }
}
