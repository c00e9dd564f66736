//! Contain-fit scaling with optional per-axis skew.
//!
//! Sizes are computed in `f64` as `(src / factor) / skew` and truncated
//! toward zero, so the same inputs always yield the same output size.

use image::RgbImage;
use tracing::debug;

use crate::resample::resize_box;
use crate::{FilterError, Result};

/// Bounding box an image is scaled to fit inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub width: f64,
    pub height: f64,
}

impl Target {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(FilterError::InvalidArgument(format!(
                "target dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl From<(u32, u32)> for Target {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }
}

/// Per-axis divisors applied after the contain-fit factor.
///
/// A divisor above 1 squashes that axis, below 1 stretches it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skew {
    pub x: f64,
    pub y: f64,
}

impl Skew {
    /// Aspect-preserving: no skew on either axis.
    pub const NONE: Skew = Skew { x: 1.0, y: 1.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Skew the vertical axis only.
    pub fn vertical(y: f64) -> Self {
        Self { x: 1.0, y }
    }

    fn validate(&self) -> Result<()> {
        if !(self.x.is_finite() && self.x > 0.0) || !(self.y.is_finite() && self.y > 0.0) {
            return Err(FilterError::InvalidArgument(format!(
                "skew divisors must be positive, got ({}, {})",
                self.x, self.y
            )));
        }
        Ok(())
    }
}

impl Default for Skew {
    fn default() -> Self {
        Self::NONE
    }
}

/// Compute the single factor that shrinks (or grows) a source to fit a target.
///
/// Returns 1 when the source already matches the target exactly. Otherwise
/// returns the larger of the two axis ratios, so the result never overflows
/// the target on either axis.
pub fn scale_factor(src_w: u32, src_h: u32, target: Target) -> Result<f64> {
    target.validate()?;
    if src_w == 0 || src_h == 0 {
        return Err(FilterError::InvalidArgument(format!(
            "source image has a zero dimension: {src_w}x{src_h}"
        )));
    }

    let (src_w, src_h) = (f64::from(src_w), f64::from(src_h));
    if src_w == target.width && src_h == target.height {
        return Ok(1.0);
    }

    let width_ratio = src_w / target.width;
    let height_ratio = src_h / target.height;
    Ok(width_ratio.max(height_ratio))
}

/// Output size of [`rescale`] for a source of `src_w` x `src_h`.
pub fn scaled_dimensions(src_w: u32, src_h: u32, target: Target, skew: Skew) -> Result<(u32, u32)> {
    skew.validate()?;
    let factor = scale_factor(src_w, src_h, target)?;

    let width = truncate_dimension((f64::from(src_w) / factor) / skew.x, "width")?;
    let height = truncate_dimension((f64::from(src_h) / factor) / skew.y, "height")?;
    debug!(src_w, src_h, factor, width, height, "Computed scaled dimensions");
    Ok((width, height))
}

fn truncate_dimension(value: f64, axis: &str) -> Result<u32> {
    let truncated = value.trunc();
    if truncated < 1.0 || truncated > f64::from(u32::MAX) {
        return Err(FilterError::InvalidArgument(format!(
            "scaled {axis} {value} does not yield a usable pixel count"
        )));
    }
    Ok(truncated as u32)
}

/// Fit `img` inside `target`, then skew, using box resampling.
///
/// The input is left untouched; a new image is returned.
pub fn rescale(img: &RgbImage, target: Target, skew: Skew) -> Result<RgbImage> {
    let (src_w, src_h) = img.dimensions();
    let (width, height) = scaled_dimensions(src_w, src_h, target, skew)?;

    debug!(
        src_w,
        src_h,
        target_w = target.width,
        target_h = target.height,
        skew_x = skew.x,
        skew_y = skew.y,
        width,
        height,
        "Rescaling image"
    );

    resize_box(img, width, height)
}
