//! Box (area-average) resampling for RGB images.
//!
//! `image::imageops` has no box filter, and the smoothing kernels it does
//! offer blur the hard pixel edges this filter depends on. Upscaling by an
//! integer factor replicates pixels exactly; downscaling averages whole
//! source blocks.

use fast_image_resize::{self as fir, PixelType, ResizeOptions};
use image::RgbImage;
use tracing::debug;

use crate::{FilterError, Result};

/// Resize `img` to exactly `width` x `height` using box resampling.
///
/// Runs on the current rayon pool, so a dedicated pipeline pool also bounds
/// the resampler's workers.
pub fn resize_box(img: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(FilterError::InvalidArgument(format!(
            "cannot resample an empty {src_w}x{src_h} image"
        )));
    }
    if width == 0 || height == 0 {
        return Err(FilterError::InvalidArgument(format!(
            "resample target {width}x{height} has a zero dimension"
        )));
    }

    if (src_w, src_h) == (width, height) {
        debug!(width, height, "Image already at target size, skipping resample");
        return Ok(img.clone());
    }

    debug!(src_w, src_h, width, height, "Box resampling image");

    let src = fir::images::ImageRef::new(src_w, src_h, img.as_raw(), PixelType::U8x3)
        .map_err(|e| FilterError::Resize(format!("source buffer rejected: {e}")))?;
    let mut dst = fir::images::Image::new(width, height, PixelType::U8x3);

    let options =
        ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Box));
    fir::Resizer::new()
        .resize(&src, &mut dst, &options)
        .map_err(|e| FilterError::Resize(format!("{src_w}x{src_h} -> {width}x{height}: {e}")))?;

    RgbImage::from_raw(width, height, dst.into_vec()).ok_or_else(|| {
        FilterError::Resize(format!("output buffer does not hold {width}x{height} pixels"))
    })
}
