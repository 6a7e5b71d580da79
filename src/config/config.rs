//! # Configuration Module
//!
//! Configuration structures and validation for scan sessions. This is the
//! common interface between the CLI and the library.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `endpoint` | `String` | http(s) URL | Recognition endpoint receiving the upload |
//! | `max_dimension` | `u32` | ≥ 1 | Longest side allowed after normalization |
//! | `jpeg_quality` | `u8` | 1-100 | Quality of the re-encoded JPEG |
//! | `timeout_secs` | `u64` | ≥ 1 | Whole-request timeout of the HTTP client |
//!
//! ## Examples
//!
//! ```rust
//! use photo_scan::config::config::ScanConfig;
//!
//! let config = ScanConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.max_dimension, 1600);
//!
//! let config = ScanConfig::new("not a url".to_string(), 1600, 75, 30);
//! assert!(config.validate().is_err());
//! ```

use reqwest::Url;

use crate::error::{ScanError, ScanResult};

/// Default recognition endpoint, matching a locally running server.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/recognize";

/// Default JPEG quality (0.75 on a 0..1 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Default whole-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration structure for a scan session.
///
/// # Examples
///
/// ```rust
/// use photo_scan::config::config::ScanConfig;
///
/// let config = ScanConfig {
///     endpoint: "https://pantry.example/api/recognize".to_string(),
///     max_dimension: 1280,
///     jpeg_quality: 80,
///     timeout_secs: 10,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Recognition endpoint URL (`POST`, multipart field `image`).
    pub endpoint: String,

    /// Longest side, in pixels, an uploaded image may have.
    ///
    /// Larger images are downscaled by a uniform factor before upload.
    pub max_dimension: u32,

    /// Quality used when re-encoding a downscaled image as JPEG.
    pub jpeg_quality: u8,

    /// Whole-request timeout applied by the HTTP client.
    pub timeout_secs: u64,
}

impl Default for ScanConfig {
    /// Default values:
    /// - `endpoint`: `http://127.0.0.1:5000/api/recognize`
    /// - `max_dimension`: 1600
    /// - `jpeg_quality`: 75
    /// - `timeout_secs`: 30
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_dimension: scan_scale::presets::DEFAULT_MAX_LONG_SIDE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ScanConfig {
    /// Creates a new configuration with the specified parameters.
    pub fn new(endpoint: String, max_dimension: u32, jpeg_quality: u8, timeout_secs: u64) -> Self {
        Self {
            endpoint,
            max_dimension,
            jpeg_quality,
            timeout_secs,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        self.endpoint_url().map_err(|e| e.to_string())?;
        if self.max_dimension == 0 {
            return Err("Max dimension must be greater than 0".to_string());
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0 seconds".to_string());
        }
        Ok(())
    }

    /// Parse the endpoint into a URL, accepting only http and https.
    pub fn endpoint_url(&self) -> ScanResult<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| ScanError::config("endpoint", &self.endpoint, e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ScanError::config(
                "endpoint",
                &self.endpoint,
                format!("unsupported scheme '{}', expected http or https", other),
            )),
        }
    }
}
