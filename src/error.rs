//! # Scan Error Handling
//!
//! Error types for the capture-to-result pipeline. Every failure a scan can hit
//! is one `ScanError` variant, and each variant knows how it is surfaced:
//!
//! - **Absorbed**: `Decode` and `Encode` happen inside normalization, which
//!   falls back to the original image instead of failing the scan
//! - **Surfaced**: `LoginRequired`, `MalformedResponse`, `Rejected`, `Network`
//!   and `Timeout` end a scan in the `Error` state with a user-facing message
//! - **Gating**: `NoSelection` and `Busy` are answered before any work starts
//! - **Setup**: `Config` and `Io` come from building a session, not from a scan
//!
//! ## Usage
//!
//! ```rust
//! use photo_scan::error::{HasRecoverySuggestion, Recoverable, ScanError};
//!
//! let error = ScanError::rejected(Some(422), Some("image too dark".to_string()))
//!     .with_operation("recognize");
//!
//! assert_eq!(error.category(), "rejected");
//! assert_eq!(error.user_message(), "image too dark");
//! assert!(error.is_recoverable());
//! assert!(error.recovery_suggestion().is_some());
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

/// Generic message used when the server rejects a scan without saying why.
pub const GENERIC_REJECTION: &str = "Recognition failed.";

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action, overriding the per-variant default
    pub recovery_suggestion: Option<String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base error type for the scan pipeline
#[derive(Debug)]
pub enum ScanError {
    /// A scan was requested with no image selected
    NoSelection { context: ErrorContext },
    /// A scan or selection was attempted while a scan is in flight
    Busy { context: ErrorContext },
    /// The selected payload could not be decoded as an image
    Decode { reason: String, context: ErrorContext },
    /// The downscaled image could not be re-encoded
    Encode { reason: String, context: ErrorContext },
    /// The endpoint answered with a redirect, i.e. a login is required
    LoginRequired {
        status: u16,
        location: Option<String>,
        context: ErrorContext,
    },
    /// The response body is not the expected JSON envelope
    MalformedResponse { reason: String, context: ErrorContext },
    /// `ok == false` in the body, or a non-success HTTP status
    Rejected {
        status: Option<u16>,
        message: Option<String>,
        context: ErrorContext,
    },
    /// Transport failures (connect, send, read)
    Network {
        operation: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
    /// The transport gave up waiting for the endpoint
    Timeout { operation: String, context: ErrorContext },
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
}

impl ScanError {
    /// Create a no-selection error
    pub fn no_selection() -> Self {
        Self::NoSelection {
            context: ErrorContext::new(),
        }
    }

    /// Create a busy error
    pub fn busy() -> Self {
        Self::Busy {
            context: ErrorContext::new(),
        }
    }

    /// Create a decode error
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an encode error
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a login-required error from a redirect response
    pub fn login_required(status: u16, location: Option<String>) -> Self {
        Self::LoginRequired {
            status,
            location,
            context: ErrorContext::new(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a rejection error; blank server messages are treated as absent
    pub fn rejected(status: Option<u16>, message: Option<String>) -> Self {
        Self::Rejected {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
            context: ErrorContext::new(),
        }
    }

    /// Create a network error
    pub fn network(operation: impl Into<String>) -> Self {
        Self::Network {
            operation: operation.into(),
            source: None,
            context: ErrorContext::new(),
        }
    }

    /// Create a network error wrapping its transport cause
    pub fn network_with_source(
        operation: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            operation: operation.into(),
            source: Some(Box::new(source)),
            context: ErrorContext::new(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Attach the path an I/O error refers to
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        if let Self::Io { path: slot, .. } = &mut self {
            *slot = Some(path.into());
        }
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::NoSelection { context } => context,
            Self::Busy { context } => context,
            Self::Decode { context, .. } => context,
            Self::Encode { context, .. } => context,
            Self::LoginRequired { context, .. } => context,
            Self::MalformedResponse { context, .. } => context,
            Self::Rejected { context, .. } => context,
            Self::Network { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::Io { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::NoSelection { context } => context,
            Self::Busy { context } => context,
            Self::Decode { context, .. } => context,
            Self::Encode { context, .. } => context,
            Self::LoginRequired { context, .. } => context,
            Self::MalformedResponse { context, .. } => context,
            Self::Rejected { context, .. } => context,
            Self::Network { context, .. } => context,
            Self::Timeout { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::Io { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::NoSelection { .. } => "no_selection",
            Self::Busy { .. } => "busy",
            Self::Decode { .. } => "decode",
            Self::Encode { .. } => "encode",
            Self::LoginRequired { .. } => "login_required",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Rejected { .. } => "rejected",
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
        }
    }

    /// Short label for the status line when a scan ends in this error.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::LoginRequired { .. } => "Login required",
            Self::MalformedResponse { .. } => "Invalid response",
            Self::Rejected { .. } => "Recognition failed",
            Self::Network { .. } | Self::Timeout { .. } => "Communication error",
            Self::NoSelection { .. } => "No image selected",
            Self::Busy { .. } => "Scan in progress",
            Self::Decode { .. } | Self::Encode { .. } => "Image error",
            Self::Config { .. } | Self::Io { .. } => "Error",
        }
    }

    /// Human-readable message for the error panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoSelection { .. } => "Please select an image.".to_string(),
            Self::Busy { .. } => "A scan is already running.".to_string(),
            Self::LoginRequired { .. } => "Login required. Sign in and try again.".to_string(),
            Self::MalformedResponse { .. } => "Could not parse the server response.".to_string(),
            Self::Rejected { message, .. } => message
                .clone()
                .unwrap_or_else(|| GENERIC_REJECTION.to_string()),
            Self::Network { .. } | Self::Timeout { .. } => {
                "Communication error. Check the connection and try again.".to_string()
            }
            Self::Decode { .. } | Self::Encode { .. } => "The image could not be processed.".to_string(),
            Self::Config { .. } | Self::Io { .. } => self.to_string(),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::NoSelection { .. } => write!(f, "No image selected"),
            ScanError::Busy { .. } => write!(f, "A scan is already in progress"),
            ScanError::Decode { reason, .. } => write!(f, "Failed to decode image: {}", reason),
            ScanError::Encode { reason, .. } => write!(f, "Failed to re-encode image: {}", reason),
            ScanError::LoginRequired {
                status, location, ..
            } => {
                if let Some(location) = location {
                    write!(f, "Login required (HTTP {} to {})", status, location)
                } else {
                    write!(f, "Login required (HTTP {})", status)
                }
            }
            ScanError::MalformedResponse { reason, .. } => {
                write!(f, "Malformed recognition response: {}", reason)
            }
            ScanError::Rejected {
                status, message, ..
            } => {
                let message = message.as_deref().unwrap_or(GENERIC_REJECTION);
                if let Some(status) = status {
                    write!(f, "Recognition rejected (HTTP {}): {}", status, message)
                } else {
                    write!(f, "Recognition rejected: {}", message)
                }
            }
            ScanError::Network {
                operation, source, ..
            } => {
                if let Some(source) = source {
                    write!(f, "Network error during {}: {}", operation, source)
                } else {
                    write!(f, "Network error during {}", operation)
                }
            }
            ScanError::Timeout { operation, .. } => write!(f, "Timeout during {}", operation),
            ScanError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            ScanError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
        }
    }
}

impl StdError for ScanError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Network {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type ScanResult<T> = Result<T, ScanError>;

/// Trait for errors the user can resolve and then retry by hand
pub trait Recoverable {
    /// Check if the user can recover from this error
    fn is_recoverable(&self) -> bool;
}

impl Recoverable for ScanError {
    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config { .. } | Self::Io { .. })
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for ScanError {
    fn recovery_suggestion(&self) -> Option<&str> {
        if let Some(suggestion) = self.context().recovery_suggestion.as_deref() {
            return Some(suggestion);
        }
        match self {
            Self::NoSelection { .. } => Some("Select an image, then scan again"),
            Self::Busy { .. } => Some("Wait for the current scan to finish"),
            Self::LoginRequired { .. } => Some("Sign in, then scan again"),
            Self::MalformedResponse { .. }
            | Self::Rejected { .. }
            | Self::Network { .. }
            | Self::Timeout { .. } => Some("Scan again"),
            Self::Config { .. } => Some("Fix the configuration value and restart"),
            Self::Decode { .. } | Self::Encode { .. } | Self::Io { .. } => None,
        }
    }
}

impl From<std::io::Error> for ScanError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<image::ImageError> for ScanError {
    fn from(error: image::ImageError) -> Self {
        Self::decode(error.to_string())
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(error: serde_json::Error) -> Self {
        Self::malformed(error.to_string())
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout("recognize")
        } else {
            Self::network_with_source("recognize", error)
        }
    }
}

impl From<scan_scale::cpu::ScaleError> for ScanError {
    fn from(error: scan_scale::cpu::ScaleError) -> Self {
        Self::encode(error.to_string())
    }
}
