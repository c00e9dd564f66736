//! Dark scanline rows between emulated display lines.

use image::RgbImage;
use rayon::prelude::*;
use tracing::debug;

use crate::palette::NEGATIVE;

/// Every row whose 0-based index is a multiple of this is blanked.
pub const SCANLINE_PERIOD: usize = 3;

/// Overwrite every third row (starting with row 0) with [`NEGATIVE`].
///
/// Other rows are left untouched. Applying it twice changes nothing further.
pub fn simulate_scanlines(img: &mut RgbImage) {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    debug!(width, height, period = SCANLINE_PERIOD, "Simulating scanlines");

    let stride = width as usize * 3;
    let buf: &mut [u8] = img;
    buf.par_chunks_mut(stride)
        .enumerate()
        .filter(|(y, _)| y % SCANLINE_PERIOD == 0)
        .for_each(|(_, row)| {
            for px in row.chunks_exact_mut(3) {
                px.copy_from_slice(&NEGATIVE.0);
            }
        });
}
