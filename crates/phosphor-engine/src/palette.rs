//! The two phosphor colors and the brightness rule that picks between them.

use image::Rgb;

/// Lit phosphor: approximates the bright green of a monochrome monitor.
pub const POSITIVE: Rgb<u8> = Rgb([107, 196, 71]);

/// Unlit phosphor: the very dark green of the tube background.
pub const NEGATIVE: Rgb<u8> = Rgb([16, 29, 11]);

/// Pixels brighter than this average become [`POSITIVE`].
pub const BRIGHTNESS_THRESHOLD: u8 = 105;

/// Floor of the average of the three channels.
pub fn brightness(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    // Max sum is 765, so the average always fits a u8.
    ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8
}

/// Map a pixel to the phosphor color it would light up as.
pub fn classify(pixel: Rgb<u8>) -> Rgb<u8> {
    if brightness(pixel) > BRIGHTNESS_THRESHOLD {
        POSITIVE
    } else {
        NEGATIVE
    }
}
