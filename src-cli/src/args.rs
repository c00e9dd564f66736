//! Command line parsing for the `phosphor` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::validation::validate_threads;

/// Green monochrome monitor filter.
///
/// Options left out fall back to the `PHOSPHOR_*` environment settings.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Image to filter; prompts (or uses the bundled sample) when omitted
    pub input: Option<PathBuf>,

    /// Where to write the filtered image [default: <stem>_phosphor.png]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Worker threads, 0 = automatic [default: PHOSPHOR_THREADS or 0]
    #[arg(long, value_name = "N", value_parser = validate_threads)]
    pub threads: Option<usize>,

    /// Also save every intermediate stage
    #[arg(long)]
    pub debug_output: bool,

    /// Never ask for a path; fall back to the default image
    #[arg(long)]
    pub no_prompt: bool,

    /// Open the original and the filtered image in the system viewer
    #[arg(long)]
    pub show: bool,
}
