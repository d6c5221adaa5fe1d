//! Highlight clipping pipeline.
//!
//! This crate provides:
//! - Highlight listing from the detection result stream
//! - Sequential segment cutting into a per-run scratch directory
//! - Concurrent crop job submission and completion-order fan-in
//! - A pull-based result stream with async and blocking consumption

pub mod config;
pub mod cutter;
pub mod dispatcher;
pub mod error;
pub mod lister;
pub mod logging;
pub mod metrics;
pub mod multiplexer;
pub mod pipeline;
pub mod scratch;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CutFailurePolicy, PipelineConfig};
pub use dispatcher::CropJobHandle;
pub use error::{PipelineError, PipelineResult, Stage};
pub use logging::{RunLogger, RunSummary};
pub use pipeline::Pipeline;
pub use scratch::ScratchSpace;
pub use stream::{BlockingResults, ResultStream, RunItem};
