//! Environment specification discovery.
//!
//! Every `*.<ext>` file in the platform subdirectory describes one environment.
//! The environment is named after the file stem and carries a companion
//! fingerprint file (`<stem>.md5`) next to it.

pub mod fingerprint;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::FINGERPRINT_EXT;
pub use fingerprint::{Fingerprint, FingerprintError, read_fingerprint};

/// One discovered specification file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSpec {
  /// File stem, used as the environment name.
  pub name: String,
  /// Path to the specification file.
  pub path: PathBuf,
  /// Path to the companion fingerprint file.
  pub fingerprint_path: PathBuf,
}

impl EnvironmentSpec {
  /// Build a spec from a file path.
  ///
  /// Returns `None` when the path has no usable file stem.
  pub fn from_path(path: &Path) -> Option<Self> {
    let name = path.file_stem()?.to_str()?.to_string();
    if name.is_empty() {
      return None;
    }
    Some(Self {
      name,
      path: path.to_path_buf(),
      fingerprint_path: path.with_extension(FINGERPRINT_EXT),
    })
  }

  /// Read the expected fingerprint for this spec.
  pub fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
    read_fingerprint(&self.fingerprint_path)
  }
}

#[derive(Debug, Error)]
pub enum DiscoverError {
  #[error("failed to read spec directory {path}: {source}")]
  ReadDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Normalize an extension filter, accepting both `yml` and `.yml`.
pub fn normalize_ext(ext: &str) -> &str {
  ext.trim_start_matches('.')
}

/// List the specs in `dir` whose extension matches `ext`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn discover(dir: &Path, ext: &str) -> Result<Vec<EnvironmentSpec>, DiscoverError> {
  let ext = normalize_ext(ext);
  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(dir = %dir.display(), "spec directory does not exist");
      return Ok(Vec::new());
    }
    Err(source) => {
      return Err(DiscoverError::ReadDir {
        path: dir.to_path_buf(),
        source,
      });
    }
  };

  let mut specs = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|source| DiscoverError::ReadDir {
      path: dir.to_path_buf(),
      source,
    })?;
    let path = entry.path();
    if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(ext) {
      continue;
    }
    if let Some(spec) = EnvironmentSpec::from_path(&path) {
      specs.push(spec);
    }
  }

  specs.sort_by(|a, b| a.path.cmp(&b.path));
  debug!(dir = %dir.display(), count = specs.len(), "discovered specs");
  Ok(specs)
}
