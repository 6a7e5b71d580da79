//! Image payloads flowing through a scan: the user's selection and the
//! normalized artifact derived from it for one upload.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use scan_scale::presets::Size;

use crate::error::{ScanError, ScanResult};

/// Content type used when nothing better can be inferred.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// The user's chosen file. Replaced wholesale on each selection, never mutated.
///
/// `data` is reference counted so handing the payload to a scan (or returning
/// it unchanged from normalization) never copies the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub name: String,
    pub content_type: String,
    pub data: Arc<Vec<u8>>,
}

impl SelectedImage {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: Arc::new(data),
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> ScanResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| ScanError::io("read image", e).with_path(path.display().to_string()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let content_type = image::ImageFormat::from_path(path)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| OCTET_STREAM.to_string());
        Ok(Self::new(name, content_type, data))
    }

    /// True when the payload claims an `image/*` content type.
    pub fn is_image(&self) -> bool {
        self.content_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// What normalization did to produce a [`NormalizedImage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Normalization {
    /// Not an image payload; forwarded untouched.
    PassThrough,
    /// Already inside the bound; forwarded untouched.
    WithinBounds { size: Size },
    /// Resampled and re-encoded.
    Downscaled { from: Size, to: Size },
    /// Decoding or re-encoding failed; the original is forwarded.
    Fallback { reason: String },
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::PassThrough => write!(f, "not an image, sent as-is"),
            Normalization::WithinBounds { size } => write!(f, "{} within bounds, sent as-is", size),
            Normalization::Downscaled { from, to } => write!(f, "downscaled {} -> {}", from, to),
            Normalization::Fallback { reason } => write!(f, "sent original ({})", reason),
        }
    }
}

/// Upload-ready payload derived from a [`SelectedImage`] for a single scan.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub name: String,
    pub content_type: String,
    pub data: Arc<Vec<u8>>,
    pub outcome: Normalization,
}

impl NormalizedImage {
    /// Forward the original payload as-is.
    pub fn unchanged(image: SelectedImage, outcome: Normalization) -> Self {
        Self {
            name: image.name,
            content_type: image.content_type,
            data: image.data,
            outcome,
        }
    }

    /// True when the bytes are the selection's own bytes.
    pub fn is_original(&self) -> bool {
        !matches!(self.outcome, Normalization::Downscaled { .. })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
