// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGB8 in → RGB8 out, tightly packed rows on both sides.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{ResizeOptions, Resizer};

use crate::presets::ScalePlan;

const RGB_BYTES: usize = 3;

#[derive(Debug)]
pub enum ScaleError {
    SourceTooSmall { expected: usize, actual: usize },
    BufferTooSmall,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::SourceTooSmall { expected, actual } => {
                write!(f, "Source buffer too small: expected {} bytes, got {}", expected, actual)
            }
            ScaleError::BufferTooSmall => write!(f, "Output buffer too small"),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}

/// Number of bytes an RGB8 buffer of `w`×`h` occupies.
pub fn rgb_len(w: u32, h: u32) -> usize {
    (w as usize) * (h as usize) * RGB_BYTES
}

/// Main scaling entry point.
/// `src_rgb` must hold `plan.input.w * plan.input.h * 3` bytes.
/// `dst` must be at least `plan.out.w * plan.out.h * 3` bytes.
pub fn scale_rgb_cpu(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    plan: &ScalePlan,
    dst: &mut [u8],
) -> Result<(), ScaleError> {
    let src_len = rgb_len(plan.input.w, plan.input.h);
    if src_rgb.len() < src_len {
        return Err(ScaleError::SourceTooSmall {
            expected: src_len,
            actual: src_rgb.len(),
        });
    }
    let dst_len = rgb_len(plan.out.w, plan.out.h);
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall);
    }

    let src_view = TypedImageRef::<U8x3>::from_buffer(plan.input.w, plan.input.h, &src_rgb[..src_len])?;
    let mut dst_image = TypedImage::<U8x3>::from_buffer(plan.out.w, plan.out.h, &mut dst[..dst_len])?;

    // Default algorithm is Lanczos3 convolution, the right trade-off for photos.
    let opts = ResizeOptions::new();
    resizer.resize_typed::<U8x3>(&src_view, &mut dst_image, &opts)?;

    Ok(())
}

/// Resize into a freshly allocated buffer sized for `plan.out`.
pub fn resize_rgb(src_rgb: &[u8], plan: &ScalePlan) -> Result<Vec<u8>, ScaleError> {
    let mut resizer = Resizer::new();
    let mut dst = vec![0u8; rgb_len(plan.out.w, plan.out.h)];
    scale_rgb_cpu(&mut resizer, src_rgb, plan, &mut dst)?;
    Ok(dst)
}
