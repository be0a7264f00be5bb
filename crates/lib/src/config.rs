//! Environment-driven defaults.
//!
//! Command-line flags take precedence; these only supply the fallback values.

use std::time::Duration;

use tracing::warn;

use crate::consts::{BACKOFF_ENV, COMMAND_ENV, DEFAULT_BACKOFF_SECS, DEFAULT_BUILD_COMMAND};

/// Returns the build command template, honoring `ENVBUILD_COMMAND`.
pub fn command_template() -> String {
  std::env::var(COMMAND_ENV)
    .ok()
    .filter(|value| !value.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_string())
}

/// Returns the backoff unit, honoring `ENVBUILD_BACKOFF_SECS`.
///
/// Unparseable values fall back to the default with a warning.
pub fn backoff_unit() -> Duration {
  let secs = match std::env::var(BACKOFF_ENV) {
    Ok(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
      warn!(value = %raw, "ignoring invalid {}", BACKOFF_ENV);
      DEFAULT_BACKOFF_SECS
    }),
    Err(_) => DEFAULT_BACKOFF_SECS,
  };
  Duration::from_secs(secs)
}
