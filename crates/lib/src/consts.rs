//! Names and defaults shared across the crate.

/// Default extension of environment specification files.
pub const DEFAULT_SPEC_EXT: &str = "yml";

/// Extension of the companion fingerprint file next to each spec.
pub const FINGERPRINT_EXT: &str = "md5";

/// Per-environment marker written after a successful build.
pub const ENV_MARKER_FILENAME: &str = "env-built.txt";

/// Prefix of the batch marker, completed with the version line.
pub const BATCH_MARKER_PREFIX: &str = "envs-build";

pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Seconds of backoff per failed attempt.
pub const DEFAULT_BACKOFF_SECS: u64 = 30;

pub const DEFAULT_BUILD_COMMAND: &str = "conda env create -f {spec} --prefix {prefix} {force}";

/// Environment variable overriding the build command template.
pub const COMMAND_ENV: &str = "ENVBUILD_COMMAND";

/// Environment variable overriding the backoff unit in seconds.
pub const BACKOFF_ENV: &str = "ENVBUILD_BACKOFF_SECS";
