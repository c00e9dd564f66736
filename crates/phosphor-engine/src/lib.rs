//! Green-phosphor monitor emulation for raster images.
//!
//! Provides a fixed five-step filter that squeezes an image into a
//! low-resolution monochrome screen buffer, thresholds it to two phosphor
//! colors, adds scanlines, and blows it back up for full-screen viewing.

pub mod monochrome;
pub mod palette;
pub mod pipeline;
pub mod resample;
pub mod scale;
pub mod scanline;

// Re-exports for convenience
pub use image::RgbImage;
pub use monochrome::make_monochrome;
pub use palette::{NEGATIVE, POSITIVE};
pub use pipeline::{FilterPipeline, Stage, apply_filter};
pub use resample::resize_box;
pub use scale::{Skew, Target, rescale, scale_factor, scaled_dimensions};
pub use scanline::simulate_scanlines;

/// Horizontal resolution of the emulated screen (double hi-res columns).
pub const EMULATED_WIDTH: u32 = 560;

/// Height the emulated screen appears to have once its tall pixels are drawn.
pub const EMULATED_HEIGHT_PERCEIVED: u32 = 384;

/// Number of pixel rows the emulated screen actually stores.
pub const EMULATED_HEIGHT_ACTUAL: u32 = 192;

/// Each emulated pixel is drawn twice as tall as it is wide.
pub const PIXEL_ASPECT_SKEW: f64 = 2.0;

/// Growth applied while undoing the vertical squash, leaving room for scanlines.
pub const SCANLINE_HEADROOM: f64 = 1.5;

/// Final blow-up relative to the emulated screen for high resolution displays.
pub const DISPLAY_ENLARGEMENT: f64 = 20.0;

/// Errors that can occur while filtering an image.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Resample failed: {0}")]
    Resize(String),

    #[error("Worker panicked during {stage}: {message}")]
    WorkerPanic { stage: &'static str, message: String },
}

/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
