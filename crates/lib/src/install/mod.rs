//! Install tree layout.
//!
//! ```text
//! <install-root>/
//! ├── envs-build-<major>.<minor>.x.txt      batch marker
//! └── <env-name>-<major>.<minor>.x/          environment prefix
//!     └── env-built.txt                      build marker
//! ```

pub mod marker;

use std::path::{Path, PathBuf};

use crate::consts::{BATCH_MARKER_PREFIX, ENV_MARKER_FILENAME};

pub use marker::{MarkerError, read_marker, write_batch_marker, write_marker};

/// Reduce a `major.minor.patch` version to its `major.minor.x` line.
///
/// Missing components are treated as `0`.
pub fn version_line(version: &str) -> String {
  let mut parts = version.trim().split('.');
  let major = parts.next().filter(|p| !p.is_empty()).unwrap_or("0");
  let minor = parts.next().filter(|p| !p.is_empty()).unwrap_or("0");
  format!("{}.{}.x", major, minor)
}

/// Paths derived from the install root and version line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
  root: PathBuf,
  version_line: String,
}

impl InstallLayout {
  pub fn new(root: impl Into<PathBuf>, version_line: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      version_line: version_line.into(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn version_line(&self) -> &str {
    &self.version_line
  }

  /// Install prefix for one environment.
  pub fn env_prefix(&self, env_name: &str) -> PathBuf {
    self.root.join(format!("{}-{}", env_name, self.version_line))
  }

  /// Build marker for one environment.
  pub fn marker_path(&self, env_name: &str) -> PathBuf {
    self.env_prefix(env_name).join(ENV_MARKER_FILENAME)
  }

  /// Marker recording that the whole batch was built for this version line.
  pub fn batch_marker_path(&self) -> PathBuf {
    self
      .root
      .join(format!("{}-{}.txt", BATCH_MARKER_PREFIX, self.version_line))
  }

  pub fn is_batch_built(&self) -> bool {
    self.batch_marker_path().is_file()
  }
}
