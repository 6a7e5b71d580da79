//! # Upload Normalization
//!
//! Bounds the size of a photo before it leaves the machine:
//! decode → constrain dimensions → re-encode.
//!
//! ## Contract
//!
//! - Non-image payloads pass through untouched
//! - Images whose longest side is within `max_dimension` pass through
//!   byte-identical (only the header is read, pixels are never decoded)
//! - Larger images are decoded, EXIF orientation is baked in, the pixels are
//!   shrunk by one uniform factor and re-encoded as JPEG
//! - [`ImageNormalizer::normalize`] never fails: any decode or encode error
//!   degrades to forwarding the original, logged at `warn`
//!
//! [`ImageNormalizer::try_normalize`] exposes the same transform with its
//! errors intact.

use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use scan_scale::presets::{build_plan, Size};
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::normalize::payload::{NormalizedImage, Normalization, SelectedImage};

/// Content type of re-encoded output.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Pure decode/resize/re-encode transform. Holds no state between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageNormalizer {
    max_dimension: u32,
    jpeg_quality: u8,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl ImageNormalizer {
    pub fn new(max_dimension: u32, jpeg_quality: u8) -> Self {
        Self {
            max_dimension,
            jpeg_quality,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.max_dimension, config.jpeg_quality)
    }

    /// Normalize `image` for upload, falling back to the original on any failure.
    pub fn normalize(&self, image: SelectedImage) -> NormalizedImage {
        match self.try_normalize(&image) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(name = %image.name, error = %e, "normalization failed, uploading original");
                NormalizedImage::unchanged(
                    image,
                    Normalization::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    /// Run [`normalize`](Self::normalize) on the blocking pool so decoding does
    /// not stall the async runtime.
    pub async fn normalize_async(&self, image: SelectedImage) -> NormalizedImage {
        let normalizer = *self;
        let original = image.clone();
        match tokio::task::spawn_blocking(move || normalizer.normalize(image)).await {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(name = %original.name, error = %e, "normalization task failed, uploading original");
                NormalizedImage::unchanged(
                    original,
                    Normalization::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    /// The checked transform behind [`normalize`](Self::normalize).
    ///
    /// # Errors
    ///
    /// - `ScanError::Decode` if the payload's header or pixels cannot be decoded
    /// - `ScanError::Encode` if resampling or JPEG encoding fails
    pub fn try_normalize(&self, image: &SelectedImage) -> ScanResult<NormalizedImage> {
        if !image.is_image() {
            debug!(name = %image.name, content_type = %image.content_type, "not an image, passing through");
            return Ok(NormalizedImage::unchanged(
                image.clone(),
                Normalization::PassThrough,
            ));
        }

        let size = read_dimensions(&image.data)?;
        if build_plan(size, self.max_dimension).is_identity() {
            debug!(name = %image.name, %size, "within bounds, passing through");
            return Ok(NormalizedImage::unchanged(
                image.clone(),
                Normalization::WithinBounds { size },
            ));
        }

        let decoded = decode_oriented(&image.data)?;
        // Orientation can swap the axes, so plan on what was actually decoded.
        let oriented = Size {
            w: decoded.width(),
            h: decoded.height(),
        };
        let plan = build_plan(oriented, self.max_dimension);
        let rgb = decoded.into_rgb8();
        let resized = scan_scale::cpu::resize_rgb(rgb.as_raw(), &plan)?;
        drop(rgb);

        let out = RgbImage::from_raw(plan.out.w, plan.out.h, resized)
            .ok_or_else(|| ScanError::encode("resized buffer does not match output size"))?;
        let data = encode_jpeg(&out, self.jpeg_quality)?;

        debug!(
            name = %image.name,
            from = %oriented,
            to = %plan.out,
            bytes_in = image.len(),
            bytes_out = data.len(),
            "downscaled image"
        );

        Ok(NormalizedImage {
            name: image.name.clone(),
            content_type: JPEG_CONTENT_TYPE.to_string(),
            data: Arc::new(data),
            outcome: Normalization::Downscaled {
                from: oriented,
                to: plan.out,
            },
        })
    }
}

/// Read pixel dimensions from the header without decoding pixel data.
fn read_dimensions(bytes: &[u8]) -> ScanResult<Size> {
    let (w, h) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ScanError::decode(e.to_string()))?
        .into_dimensions()?;
    Ok(Size { w, h })
}

/// Full decode with the EXIF orientation applied to the pixels.
fn decode_oriented(bytes: &[u8]) -> ScanResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ScanError::decode(e.to_string()))?
        .into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut decoded = DynamicImage::from_decoder(decoder)?;
    decoded.apply_orientation(orientation);
    Ok(decoded)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> ScanResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image
        .write_with_encoder(encoder)
        .map_err(|e| ScanError::encode(e.to_string()))?;
    Ok(buffer.into_inner())
}
