//! # Photo Scan Library
//!
//! Client side of a photo recognition service: pick a photo, shrink it locally
//! to bound the upload, post it to a recognition endpoint and render the
//! classified items with confidence scores.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `normalize`: Image payloads and the decode, downscale and re-encode transform
//! - `recognition`: Multipart upload client and response classification
//! - `state`: The idle / scanning / success / error controller
//! - `render`: Result items to display rows
//! - `session`: High-level scan orchestration over a [`ScanSink`]
//! - `config`: Configuration management and validation
//! - `telemetry`: Tracing subscriber setup for binaries
//!
//! ## Features
//!
//! - **Best-effort normalization**: a payload that cannot be decoded is uploaded as-is
//! - **Single flight**: a second scan while one is running is rejected, not queued
//! - **Login detection**: redirects are surfaced as a login error, never followed
//! - **Async/await**: Built on Tokio; decoding runs on the blocking pool
//!
//! ## Example
//!
//! ```rust,no_run
//! use photo_scan::{HttpRecognitionClient, NullSink, ScanConfig, ScanSession, SelectedImage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::default();
//! let client = HttpRecognitionClient::new(&config)?;
//! let session = ScanSession::new(&config, client, NullSink);
//!
//! session.select(Some(SelectedImage::from_path("fridge.jpg")?))?;
//! let status = session.scan().await?;
//! println!("{}: {:?}", status, session.rows());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod normalize;
pub mod recognition;
pub mod render;
pub mod session;
pub mod state;
pub mod telemetry;

/// Re-export error types for convenience
pub use error::{HasRecoverySuggestion, Recoverable, ScanError, ScanResult};

pub use config::ScanConfig;
pub use normalize::{ImageNormalizer, NormalizedImage, Normalization, SelectedImage};
pub use recognition::{
    ClassificationItem, EndpointResponse, HttpRecognitionClient, RecognitionClient,
    classify_response,
};
pub use render::{DisplayRow, ItemRow, Placeholder, render};
pub use session::{NullSink, ScanSession, ScanSink};
pub use state::{ScanStateController, ScanStatus, StatusView};
