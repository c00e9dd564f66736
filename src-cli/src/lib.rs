//! Command line front end for the phosphor monitor filter.
//!
//! Picks an input (argument, prompt, or bundled sample), runs it through
//! [`phosphor_engine::FilterPipeline`], and writes the result next to it.
//! With `--show` both images are then handed to the system viewer.

pub mod args;
pub mod config;
pub mod imaging;
pub mod prompt;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use phosphor_engine::{FilterPipeline, Stage};

use args::CliArgs;
use config::AppConfig;

/// Everything needed for one filter run, after merging config and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub threads: usize,
    pub debug_output: bool,
    pub show: bool,
}

impl Job {
    /// Merge command line flags over configuration. `input` must already be chosen.
    pub fn new(input: PathBuf, args: &CliArgs, config: &AppConfig) -> Self {
        let output_dir = config.output_dir.clone();
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| imaging::default_output_path(&input, output_dir.as_deref()));
        Self {
            input,
            output,
            output_dir,
            threads: args.threads.unwrap_or(config.threads),
            debug_output: args.debug_output || config.debug_output,
            show: args.show,
        }
    }

    fn stage_path(&self, stage: Stage) -> PathBuf {
        imaging::stage_output_path(&self.input, self.output_dir.as_deref(), stage)
    }
}

/// Choose the input path: explicit argument, then prompt, then the default image.
pub fn resolve_input(args: &CliArgs, config: &AppConfig, interactive: bool) -> Result<PathBuf> {
    if let Some(input) = &args.input {
        return Ok(input.clone());
    }
    if interactive && !args.no_prompt {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        return prompt::ask_for_file(&mut stdin.lock(), &mut stdout, &config.default_image);
    }
    Ok(config.default_image.clone())
}

/// Load, filter and save one image. Returns the path written.
pub fn filter_file(job: &Job) -> Result<PathBuf> {
    let source = imaging::load_rgb(&job.input)?;
    tracing::info!(
        input = %job.input.display(),
        width = source.width(),
        height = source.height(),
        "Loaded original image"
    );

    let pipeline = FilterPipeline::with_threads(job.threads)?;

    let mut stage_error = None;
    let filtered = pipeline.run_with(&source, |stage, img| {
        if !job.debug_output || stage == Stage::Display || stage_error.is_some() {
            return;
        }
        let path = job.stage_path(stage);
        match imaging::save_rgb(img, &path) {
            Ok(()) => tracing::info!(stage = stage.name(), path = %path.display(), "Saved stage"),
            Err(e) => stage_error = Some(e),
        }
    })?;
    if let Some(e) = stage_error {
        return Err(e);
    }

    imaging::save_rgb(&filtered, &job.output)?;
    tracing::info!(
        output = %job.output.display(),
        width = filtered.width(),
        height = filtered.height(),
        "Saved filtered image"
    );
    Ok(job.output.clone())
}

/// Hand the original and then the filtered image to `opener`.
///
/// Stops at the first path the opener rejects.
pub fn show_results<F>(job: &Job, mut opener: F) -> Result<()>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    for path in [&job.input, &job.output] {
        opener(path.as_path()).with_context(|| format!("Failed to open {} in the image viewer", path.display()))?;
        tracing::debug!(path = %path.display(), "Opened in image viewer");
    }
    Ok(())
}

/// Entry point used by the `phosphor` binary.
pub fn run() -> Result<()> {
    config::load_dotenv();
    let config = AppConfig::from_env();
    let args = CliArgs::parse();

    let input = resolve_input(&args, &config, std::io::stdin().is_terminal())?;
    let job = Job::new(input, &args, &config);
    tracing::debug!(?job, "Resolved filter job");

    let written = filter_file(&job)?;
    println!("{}", written.display());

    if job.show {
        if let Err(e) = show_results(&job, |path| open::that(path)) {
            tracing::warn!("{e:#}");
        }
    }
    Ok(())
}
