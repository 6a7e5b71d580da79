// SPDX-License-Identifier: MIT
//! # scan-scale: Bounded Downscaling for Photo Uploads
//!
//! This crate computes and executes the "constrain dimensions" step of upload
//! normalization: a photo whose longest side exceeds a limit is shrunk by one
//! uniform factor, everything else is left alone.
//!
//! ## Key Components
//!
//! - [`presets`]: Scale plan computation (`scale = min(1, max_long / long_side)`)
//! - [`cpu`]: CPU resampling of tightly packed RGB8 buffers using fast_image_resize
//!
//! ## Rounding
//!
//! Each output axis is rounded to the nearest integer pixel independently and
//! clamped to at least 1px. Plans never upscale.
//!
//! ## Usage Example
//!
//! ```rust
//! use scan_scale::presets::{build_plan, Size};
//!
//! let plan = build_plan(Size { w: 4032, h: 3024 }, 1600);
//! assert_eq!((plan.out.w, plan.out.h), (1600, 1200));
//! assert!(!plan.is_identity());
//! ```

pub mod cpu;
pub mod presets;
