// SPDX-License-Identifier: MIT
//! # Scale Plan Computation
//!
//! This module decides whether an image needs to shrink and, if so, to which
//! dimensions. It is pure arithmetic and never touches pixel data.
//!
//! ## Design
//!
//! - **Uniform factor**: `scale = min(1, max_long / max(w, h))`, applied to both axes
//! - **Independent rounding**: each axis is rounded to the nearest integer on its own
//! - **No upscaling**: inputs already inside the bound produce an identity plan
//! - Clamp to minimum 1px so extreme aspect ratios never yield an empty axis

/// Longest side, in pixels, that an upload may have after normalization.
pub const DEFAULT_MAX_LONG_SIDE: u32 = 1600;

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    /// Longest side of the rectangle.
    pub fn long_side(self) -> u32 {
        self.w.max(self.h)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Complete scaling plan computed from input parameters.
#[derive(Clone, Copy, Debug)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Longest side the output may have
    pub max_long: u32,
    /// Uniform scale factor, always in `(0, 1]`
    pub scale: f64,
    /// Final computed output dimensions
    pub out: Size,
}

impl ScalePlan {
    /// True when the input already fits and no resampling should happen.
    pub fn is_identity(&self) -> bool {
        self.scale >= 1.0
    }
}

/// Compute the scaling plan for `input` bounded by `max_long` on its longest side.
///
/// # Arguments
/// * `input` - Source image dimensions
/// * `max_long` - Maximum allowed longest side
///
/// # Returns
/// A ScalePlan whose `out` fits within `max_long` and keeps the aspect ratio
/// within integer-rounding tolerance. Zero-sized inputs yield an identity plan.
pub fn build_plan(input: Size, max_long: u32) -> ScalePlan {
    let long = input.long_side();
    if long == 0 {
        return ScalePlan {
            input,
            max_long,
            scale: 1.0,
            out: input,
        };
    }

    let scale = (f64::from(max_long) / f64::from(long)).min(1.0);
    let out = if scale >= 1.0 {
        input
    } else {
        let (w, h) = fit_preserve(input, scale);
        Size { w, h }
    };

    ScalePlan {
        input,
        max_long,
        scale,
        out,
    }
}

/// Apply a uniform scale factor, rounding each axis independently.
fn fit_preserve(input: Size, scale: f64) -> (u32, u32) {
    let (w, h) = (f64::from(input.w), f64::from(input.h));
    (
        ((w * scale).round() as u32).max(1),
        ((h * scale).round() as u32).max(1),
    )
}
