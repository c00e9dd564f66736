//! Runtime configuration: built-in defaults with environment overrides.

use std::path::PathBuf;

use super::validation::validate_setting;

/// Bundled sample shown when no input path is given.
pub const DEFAULT_IMAGE: &str = "images/sample.ppm";

/// Upper bound for `PHOSPHOR_THREADS`.
pub const MAX_THREADS: usize = 256;

/// Runtime configuration for the `phosphor` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub default_image: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub threads: usize,
    pub debug_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_image: PathBuf::from(DEFAULT_IMAGE),
            output_dir: None,
            threads: 0,
            debug_output: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, keeping defaults for missing or
    /// invalid values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> Option<String> {
            let value = lookup(key)?;
            let value = value.trim().to_string();
            if value.is_empty() {
                return None;
            }
            match validate_setting(key, &value) {
                Ok(()) => Some(value),
                Err(e) => {
                    tracing::warn!("Ignoring {key}={value:?}: {e}");
                    None
                }
            }
        };

        let mut config = Self::default();

        if let Some(v) = g("PHOSPHOR_DEFAULT_IMAGE") {
            config.default_image = PathBuf::from(v);
        }
        if let Some(v) = g("PHOSPHOR_OUTPUT_DIR") {
            config.output_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = g("PHOSPHOR_THREADS") {
            config.threads = v.parse().unwrap_or(config.threads);
        }
        if let Some(v) = g("PHOSPHOR_DEBUG_OUTPUT") {
            config.debug_output = parse_bool(&v).unwrap_or(config.debug_output);
        }

        config
    }
}

/// Accepts `true`/`false`/`1`/`0`, case-insensitively.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
