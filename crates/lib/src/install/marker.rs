//! Build and batch markers.
//!
//! Markers are replaced atomically: the content goes to a temp file in the
//! target directory which is then renamed over the marker. A half-written
//! marker can never match a fingerprint.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::spec::Fingerprint;

#[derive(Debug, Error)]
pub enum MarkerError {
  #[error("failed to read marker {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write marker {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Read the fingerprint recorded in a marker.
///
/// Returns `Ok(None)` if no marker exists. Undecodable bytes are replaced,
/// so a garbled marker simply fails to match.
pub fn read_marker(path: &Path) -> Result<Option<Fingerprint>, MarkerError> {
  match fs::read(path) {
    Ok(bytes) => Ok(Some(Fingerprint::parse(&String::from_utf8_lossy(&bytes)))),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(source) => Err(MarkerError::Read {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// Record `fingerprint` as the build marker at `path`.
pub fn write_marker(path: &Path, fingerprint: &Fingerprint) -> Result<(), MarkerError> {
  write_atomic(path, fingerprint.to_marker_contents().as_bytes())?;
  debug!(path = %path.display(), fingerprint = %fingerprint, "build marker written");
  Ok(())
}

/// Record that the batch finished. The file content is informational only.
pub fn write_batch_marker(path: &Path, version_line: &str) -> Result<(), MarkerError> {
  write_atomic(path, format!("{}\n", version_line).as_bytes())?;
  debug!(path = %path.display(), "batch marker written");
  Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), MarkerError> {
  let write_err = |source: io::Error| MarkerError::Write {
    path: path.to_path_buf(),
    source,
  };

  let dir = path
    .parent()
    .ok_or_else(|| write_err(io::Error::new(io::ErrorKind::InvalidInput, "marker path has no parent")))?;
  fs::create_dir_all(dir).map_err(write_err)?;

  let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
  temp.write_all(contents).map_err(write_err)?;
  temp.as_file().sync_all().map_err(write_err)?;
  temp.persist(path).map_err(|e| write_err(e.error))?;
  Ok(())
}
