//! # Normalize Module
//!
//! Image payload types and the upload normalization transform.

pub mod normalizer;
pub mod payload;

pub use normalizer::{ImageNormalizer, JPEG_CONTENT_TYPE};
pub use payload::{NormalizedImage, Normalization, SelectedImage};
