//! Fingerprint files.
//!
//! A fingerprint is the first line of a small text file (typically an md5 sum
//! of the spec) with trailing whitespace removed. The same rule applies to the
//! build marker, which holds a copy of the fingerprint.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub String);

impl Fingerprint {
  /// Parse a fingerprint from file contents.
  ///
  /// Only the first line counts; trailing whitespace is ignored.
  pub fn parse(contents: &str) -> Self {
    let first = contents.lines().next().unwrap_or_default();
    Fingerprint(first.trim_end().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Contents written to a marker file.
  pub fn to_marker_contents(&self) -> String {
    format!("{}\n", self.0)
  }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Error)]
pub enum FingerprintError {
  #[error("fingerprint file not found: {0}")]
  Missing(PathBuf),

  #[error("failed to read fingerprint file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("fingerprint file is empty: {0}")]
  Empty(PathBuf),
}

/// Read the fingerprint stored at `path`.
pub fn read_fingerprint(path: &Path) -> Result<Fingerprint, FingerprintError> {
  let contents = match fs::read_to_string(path) {
    Ok(contents) => contents,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(FingerprintError::Missing(path.to_path_buf())),
    Err(source) => {
      return Err(FingerprintError::Read {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  let fingerprint = Fingerprint::parse(&contents);
  if fingerprint.0.is_empty() {
    return Err(FingerprintError::Empty(path.to_path_buf()));
  }
  Ok(fingerprint)
}
