//! Setting value validation.

use super::app_config::{MAX_THREADS, parse_bool};

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "PHOSPHOR_THREADS" => {
            validate_threads(value)?;
        }
        "PHOSPHOR_DEBUG_OUTPUT" => {
            if parse_bool(value).is_none() {
                return Err("must be 'true', 'false', '1' or '0'".into());
            }
        }
        "PHOSPHOR_DEFAULT_IMAGE" | "PHOSPHOR_OUTPUT_DIR" => {
            if value.contains('\0') {
                return Err("path must not contain NUL bytes".into());
            }
        }
        _ => {}
    }
    Ok(())
}

/// Worker count: an integer in `0..=MAX_THREADS`, 0 meaning automatic.
pub fn validate_threads(value: &str) -> Result<usize, String> {
    let v: usize = value.parse().map_err(|_| "must be a non-negative integer")?;
    if v > MAX_THREADS {
        return Err(format!("must be at most {MAX_THREADS}"));
    }
    Ok(v)
}
