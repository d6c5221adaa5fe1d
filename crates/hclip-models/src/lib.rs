//! Shared data models for the hclip highlight pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Highlight descriptors and analysis records
//! - Clip filename sanitization
//! - Analysis and auto-crop request settings
//! - Crop job outcomes and caller-facing output records

pub mod aspect;
pub mod clip;
pub mod highlight;
pub mod result;
pub mod run;
pub mod settings;

// Re-export common types
pub use aspect::{AspectRatio, AspectRatioParseError};
pub use clip::{sanitize_filename_title, ClipNamer, CLIP_SUFFIX};
pub use highlight::{
    highlights_from_record, HighlightDescriptor, HighlightsRecordError, RawHighlight,
    HIGHLIGHTS_KEY,
};
pub use result::{
    CropFailure, CropFailureKind, CropJobRef, CroppedResult, CroppedVideo, OutputRecord,
};
pub use run::{RunId, SourceVideo};
pub use settings::{AnalysisSettings, CropSettings};
