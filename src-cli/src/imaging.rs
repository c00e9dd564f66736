//! Loading source images and writing filtered results.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use phosphor_engine::Stage;

/// Suffix added to the input's file stem for the filtered output.
pub const OUTPUT_SUFFIX: &str = "_phosphor";

/// Decode `path` into an RGB buffer. Any alpha channel is dropped.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).with_context(|| format!("Failed to open image {}", path.display()))?;
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        color = ?img.color(),
        "Decoded source image"
    );
    Ok(img.to_rgb8())
}

/// Encode `img` to `path`; the format follows the file extension.
pub fn save_rgb(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    img.save(path)
        .with_context(|| format!("Failed to save image {}", path.display()))
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

fn target_dir(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    }
}

/// `<dir>/<stem>_phosphor.png`, where `dir` is `output_dir` or the input's directory.
pub fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    target_dir(input, output_dir).join(format!("{}{OUTPUT_SUFFIX}.png", file_stem(input)))
}

/// `<dir>/<stem>_<index>_<stage>.png` for intermediate stage dumps.
pub fn stage_output_path(input: &Path, output_dir: Option<&Path>, stage: Stage) -> PathBuf {
    target_dir(input, output_dir).join(format!(
        "{}_{}_{}.png",
        file_stem(input),
        stage.index(),
        stage.name()
    ))
}
