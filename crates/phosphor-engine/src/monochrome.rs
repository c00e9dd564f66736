//! Two-color thresholding onto the phosphor palette.

use image::{Rgb, RgbImage};
use rayon::prelude::*;
use tracing::debug;

use crate::palette::classify;

/// Recolor every pixel to [`POSITIVE`](crate::POSITIVE) or
/// [`NEGATIVE`](crate::NEGATIVE) by its average channel brightness.
///
/// Works in place and hands the same buffer back, so calls can be chained.
/// Pixels are independent, so they are split across workers.
pub fn make_monochrome(img: &mut RgbImage) -> &mut RgbImage {
    let (width, height) = img.dimensions();
    debug!(width, height, "Applying monochrome threshold");

    let buf: &mut [u8] = img;
    buf.par_chunks_exact_mut(3).for_each(|px| {
        let lit = classify(Rgb([px[0], px[1], px[2]]));
        px.copy_from_slice(&lit.0);
    });
    img
}
