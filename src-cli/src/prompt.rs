//! Interactive input path selection.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const PROMPT: &str = "Enter the path to an image file (or press enter to use default image): ";

/// Ask for an image path on `output`, reading the answer from `input`.
///
/// An empty answer (or end of input) selects `default`.
pub fn ask_for_file<R, W>(input: &mut R, output: &mut W, default: &Path) -> Result<PathBuf>
where
    R: BufRead,
    W: Write,
{
    output
        .write_all(PROMPT.as_bytes())
        .and_then(|()| output.flush())
        .context("Failed to write prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read image path")?;

    let answer = line.trim();
    if answer.is_empty() {
        tracing::debug!(default = %default.display(), "No path entered, using default image");
        Ok(default.to_path_buf())
    } else {
        Ok(PathBuf::from(answer))
    }
}
