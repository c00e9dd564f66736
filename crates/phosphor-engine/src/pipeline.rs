//! The five-step phosphor monitor filter.
//!
//! 1. Contain-fit into the emulated screen, squashing height by
//!    [`PIXEL_ASPECT_SKEW`] since the emulated pixels are twice as tall as wide.
//! 2. Threshold to the two phosphor colors.
//! 3. Undo the squash while growing by [`SCANLINE_HEADROOM`], so that every
//!    emulated row spans three output rows.
//! 4. Blank every third row.
//! 5. Blow the result up by [`DISPLAY_ENLARGEMENT`] for full-screen viewing.
//!
//! Steps run strictly in order. Work inside a step may be spread across a
//! rayon pool, but each step finishes before the next starts.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use image::RgbImage;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error};

use crate::monochrome::make_monochrome;
use crate::scale::{Skew, Target, rescale};
use crate::scanline::simulate_scanlines;
use crate::{
    DISPLAY_ENLARGEMENT, EMULATED_HEIGHT_ACTUAL, EMULATED_HEIGHT_PERCEIVED, EMULATED_WIDTH,
    FilterError, PIXEL_ASPECT_SKEW, Result, SCANLINE_HEADROOM,
};

/// One step of the filter, reported to observers after it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    EmulatedScreen,
    Monochrome,
    AspectCorrected,
    Scanlines,
    Display,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::EmulatedScreen,
        Stage::Monochrome,
        Stage::AspectCorrected,
        Stage::Scanlines,
        Stage::Display,
    ];

    /// 1-based position in the pipeline.
    pub fn index(self) -> usize {
        match self {
            Stage::EmulatedScreen => 1,
            Stage::Monochrome => 2,
            Stage::AspectCorrected => 3,
            Stage::Scanlines => 4,
            Stage::Display => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::EmulatedScreen => "emulated-screen",
            Stage::Monochrome => "monochrome",
            Stage::AspectCorrected => "aspect-corrected",
            Stage::Scanlines => "scanlines",
            Stage::Display => "display",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Step 1: fit into the emulated screen with tall pixels squashed.
pub fn emulate_screen(img: &RgbImage) -> Result<RgbImage> {
    rescale(
        img,
        Target::from((EMULATED_WIDTH, EMULATED_HEIGHT_PERCEIVED)),
        Skew::vertical(PIXEL_ASPECT_SKEW),
    )
}

/// Step 3: restore the aspect ratio and make room for scanlines.
pub fn correct_aspect(img: &RgbImage) -> Result<RgbImage> {
    rescale(
        img,
        Target::new(
            f64::from(EMULATED_WIDTH) * SCANLINE_HEADROOM,
            f64::from(EMULATED_HEIGHT_ACTUAL) * SCANLINE_HEADROOM,
        ),
        Skew::vertical(1.0 / PIXEL_ASPECT_SKEW),
    )
}

/// Step 5: aspect-preserving enlargement for high resolution displays.
pub fn enlarge_for_display(img: &RgbImage) -> Result<RgbImage> {
    rescale(
        img,
        Target::new(
            f64::from(EMULATED_WIDTH) * DISPLAY_ENLARGEMENT,
            f64::from(EMULATED_HEIGHT_ACTUAL) * DISPLAY_ENLARGEMENT,
        ),
        Skew::NONE,
    )
}

/// Runs the filter, optionally on a dedicated worker pool.
#[derive(Debug, Default)]
pub struct FilterPipeline {
    pool: Option<ThreadPool>,
}

impl FilterPipeline {
    /// Pipeline that uses rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with its own pool of `threads` workers; 0 keeps rayon's default.
    pub fn with_threads(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Ok(Self::new());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("phosphor-worker-{i}"))
            .build()?;
        debug!(threads, "Built dedicated filter pool");
        Ok(Self { pool: Some(pool) })
    }

    /// Apply the whole filter. The input is never modified.
    pub fn run(&self, img: &RgbImage) -> Result<RgbImage> {
        self.run_with(img, |_, _| {})
    }

    /// Apply the whole filter, handing each intermediate image to `observer`.
    pub fn run_with<F>(&self, img: &RgbImage, mut observer: F) -> Result<RgbImage>
    where
        F: FnMut(Stage, &RgbImage),
    {
        let (width, height) = img.dimensions();
        debug!(width, height, "Starting phosphor filter");

        let mut screen = self.in_pool(Stage::EmulatedScreen, || emulate_screen(img))??;
        self.report(Stage::EmulatedScreen, &screen, &mut observer);

        self.in_pool(Stage::Monochrome, || {
            make_monochrome(&mut screen);
        })?;
        self.report(Stage::Monochrome, &screen, &mut observer);

        let mut corrected = self.in_pool(Stage::AspectCorrected, || correct_aspect(&screen))??;
        self.report(Stage::AspectCorrected, &corrected, &mut observer);

        self.in_pool(Stage::Scanlines, || simulate_scanlines(&mut corrected))?;
        self.report(Stage::Scanlines, &corrected, &mut observer);

        let display = self.in_pool(Stage::Display, || enlarge_for_display(&corrected))??;
        self.report(Stage::Display, &display, &mut observer);

        Ok(display)
    }

    /// Run one step's work, on the dedicated pool if there is one.
    ///
    /// A panic in any worker becomes [`FilterError::WorkerPanic`] and the
    /// step's partial output is dropped.
    fn in_pool<R, OP>(&self, stage: Stage, op: OP) -> Result<R>
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        let guarded = move || panic::catch_unwind(AssertUnwindSafe(op));
        let outcome = match &self.pool {
            Some(pool) => pool.install(guarded),
            None => guarded(),
        };
        outcome.map_err(|payload| {
            let message = panic_message(payload.as_ref());
            error!(stage = stage.name(), %message, "Filter step panicked");
            FilterError::WorkerPanic {
                stage: stage.name(),
                message,
            }
        })
    }

    fn report<F>(&self, stage: Stage, img: &RgbImage, observer: &mut F)
    where
        F: FnMut(Stage, &RgbImage),
    {
        let (width, height) = img.dimensions();
        debug!(stage = stage.name(), width, height, "Stage complete");
        observer(stage, img);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Apply the filter on rayon's global pool.
pub fn apply_filter(img: &RgbImage) -> Result<RgbImage> {
    FilterPipeline::new().run(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::scaled_dimensions;
    use crate::{NEGATIVE, POSITIVE};
    use image::Rgb;
    use rayon::prelude::*;

    fn create_checkerboard(width: u32, height: u32, cell: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([240, 240, 240])
            } else {
                Rgb([10, 10, 10])
            }
        })
    }

    fn is_palette(img: &RgbImage) -> bool {
        img.pixels().all(|p| *p == POSITIVE || *p == NEGATIVE)
    }

    fn expected_final_dimensions(width: u32, height: u32) -> (u32, u32) {
        let (w, h) = scaled_dimensions(
            width,
            height,
            Target::from((EMULATED_WIDTH, EMULATED_HEIGHT_PERCEIVED)),
            Skew::vertical(2.0),
        )
        .unwrap();
        let (w, h) = scaled_dimensions(w, h, Target::new(840.0, 288.0), Skew::vertical(0.5)).unwrap();
        scaled_dimensions(w, h, Target::new(11200.0, 3840.0), Skew::NONE).unwrap()
    }

    #[test]
    fn test_single_bright_pixel_becomes_positive() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([200, 200, 200]));
        make_monochrome(&mut img);
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(*img.get_pixel(0, 0), POSITIVE);
    }

    #[test]
    fn test_single_bright_pixel_through_first_two_steps() {
        let img = RgbImage::from_pixel(1, 1, Rgb([200, 200, 200]));
        let mut screen = emulate_screen(&img).unwrap();
        make_monochrome(&mut screen);

        assert!(screen.width() >= 1 && screen.height() >= 1);
        assert!(screen.pixels().all(|p| *p == POSITIVE));
    }

    #[test]
    fn test_emulated_size_input_is_only_skewed() {
        // Rows come in identical pairs, so halving the height loses nothing.
        let img = RgbImage::from_fn(EMULATED_WIDTH, EMULATED_HEIGHT_PERCEIVED, |x, y| {
            Rgb([(x % 256) as u8, ((y / 2) % 256) as u8, 42])
        });

        let screen = emulate_screen(&img).unwrap();

        assert_eq!(screen.dimensions(), (EMULATED_WIDTH, EMULATED_HEIGHT_ACTUAL));
        for y in 0..EMULATED_HEIGHT_ACTUAL {
            for x in 0..EMULATED_WIDTH {
                assert_eq!(
                    screen.get_pixel(x, y),
                    img.get_pixel(x, y * 2),
                    "Mismatch at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_correct_aspect_triples_emulated_rows() {
        let screen = RgbImage::from_fn(EMULATED_WIDTH, EMULATED_HEIGHT_ACTUAL, |_, y| {
            if y % 2 == 0 { POSITIVE } else { NEGATIVE }
        });

        let corrected = correct_aspect(&screen).unwrap();

        // 560x192 -> 840x576: each emulated row spans three output rows.
        assert_eq!(corrected.dimensions(), (840, 576));
        for y in 0..576 {
            assert_eq!(corrected.get_pixel(0, y), screen.get_pixel(0, y / 3), "Row {y}");
        }
    }

    #[test]
    fn test_full_pipeline_checkerboard_dimensions() {
        let img = create_checkerboard(64, 48, 8);
        let result = apply_filter(&img).unwrap();

        assert_eq!(result.dimensions(), expected_final_dimensions(64, 48));
        assert!(result.width() <= EMULATED_WIDTH * 20);
        assert!(result.height() <= EMULATED_HEIGHT_ACTUAL * 20);
        // Height-bound for any input narrower than the display canvas.
        assert!(result.height() + 1 >= EMULATED_HEIGHT_ACTUAL * 20);
    }

    #[test]
    fn test_full_pipeline_output_is_palette_only() {
        let img = create_checkerboard(40, 30, 5);
        let result = apply_filter(&img).unwrap();
        assert!(is_palette(&result));
    }

    #[test]
    fn test_full_pipeline_size_independent_of_content() {
        let checker = create_checkerboard(64, 48, 8);
        let flat = RgbImage::from_pixel(64, 48, Rgb([30, 60, 90]));

        let a = apply_filter(&checker).unwrap();
        let b = apply_filter(&flat).unwrap();
        assert_eq!(a.dimensions(), b.dimensions());
        assert!(b.pixels().all(|p| *p == NEGATIVE));
    }

    #[test]
    fn test_run_does_not_mutate_input() {
        let img = create_checkerboard(24, 16, 4);
        let before = img.clone();
        let _ = apply_filter(&img).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_observer_sees_every_stage_in_order() {
        let img = create_checkerboard(32, 24, 4);
        let mut seen = Vec::new();

        FilterPipeline::new()
            .run_with(&img, |stage, out| {
                match stage {
                    Stage::Monochrome => assert!(is_palette(out)),
                    Stage::Scanlines => {
                        for y in (0..out.height()).step_by(3) {
                            assert!(
                                (0..out.width()).all(|x| *out.get_pixel(x, y) == NEGATIVE),
                                "Row {y} should be a scanline"
                            );
                        }
                    }
                    _ => {}
                }
                seen.push(stage);
            })
            .unwrap();

        assert_eq!(seen, Stage::ALL.to_vec());
    }

    #[test]
    fn test_dedicated_pool_matches_global_pool() {
        let img = create_checkerboard(20, 12, 3);
        let global = FilterPipeline::new().run(&img).unwrap();
        let pooled = FilterPipeline::with_threads(2).unwrap().run(&img).unwrap();
        assert_eq!(global, pooled);
    }

    #[test]
    fn test_degenerate_input_is_rejected() {
        let img = RgbImage::from_pixel(10000, 1, Rgb([255, 255, 255]));
        assert!(matches!(
            apply_filter(&img),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let img = RgbImage::new(0, 0);
        assert!(matches!(
            apply_filter(&img),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_step_panic_becomes_error() {
        let pipeline = FilterPipeline::new();
        let result: Result<()> = pipeline.in_pool(Stage::Scanlines, || panic!("row buffer torn"));

        match result {
            Err(FilterError::WorkerPanic { stage, message }) => {
                assert_eq!(stage, "scanlines");
                assert_eq!(message, "row buffer torn");
            }
            other => panic!("Expected WorkerPanic, got {other:?}"),
        }
    }

    #[test]
    fn test_panic_inside_dedicated_pool_worker_becomes_error() {
        let pipeline = FilterPipeline::with_threads(2).unwrap();
        let result = pipeline.in_pool(Stage::Monochrome, || {
            (0..64u32).into_par_iter().for_each(|i| {
                if i == 37 {
                    panic!("worker {i} failed");
                }
            });
        });

        match result {
            Err(FilterError::WorkerPanic { stage, message }) => {
                assert_eq!(stage, "monochrome");
                assert_eq!(message, "worker 37 failed");
            }
            other => panic!("Expected WorkerPanic, got {other:?}"),
        }
    }

    #[test]
    fn test_pipeline_still_usable_after_panic() {
        let pipeline = FilterPipeline::with_threads(1).unwrap();
        let _: Result<()> = pipeline.in_pool(Stage::Display, || panic!("boom"));
        let img = create_checkerboard(16, 12, 4);
        assert!(pipeline.run(&img).is_ok());
    }

    #[test]
    fn test_stage_names_and_indices() {
        let indices: Vec<usize> = Stage::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert_eq!(Stage::AspectCorrected.to_string(), "aspect-corrected");
    }
}
