//! Clients for the remote highlight detection and auto-crop services.
//!
//! The pipeline depends only on the [`HighlightDetector`] and [`CropService`]
//! traits; this crate also ships HTTP implementations of both.

pub mod autocrop;
pub mod client;
pub mod detection;
pub mod error;
pub mod ndjson;
pub mod service;
pub mod types;

pub use autocrop::HttpCropService;
pub use client::{ServiceClient, ServiceConfig};
pub use detection::HttpHighlightDetector;
pub use error::{RemoteError, RemoteResult};
pub use ndjson::decode_ndjson;
pub use service::{CropService, HighlightDetector, RecordStream};
pub use types::{CropJobState, CropJobStatus};
