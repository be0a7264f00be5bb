//! Platform family selection.
//!
//! Specification files live in a subdirectory named after the platform family
//! (`linux` or `mac`). Any other operating system is rejected up front.

pub mod os;

use std::fmt;

use os::Os;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
  #[error("{0} is not supported")]
  Unsupported(String),
}

/// Platform family used to pick the spec subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
  Linux,
  Mac,
}

impl PlatformFamily {
  /// Detect the family of the running system.
  pub fn detect() -> Result<Self, PlatformError> {
    match Os::current() {
      Some(os) => Self::for_os(os),
      None => Err(PlatformError::Unsupported(std::env::consts::OS.to_string())),
    }
  }

  pub fn for_os(os: Os) -> Result<Self, PlatformError> {
    match os {
      Os::Linux => Ok(Self::Linux),
      Os::MacOs => Ok(Self::Mac),
      Os::Windows => Err(PlatformError::Unsupported("Windows".to_string())),
    }
  }

  /// Name of the spec subdirectory for this family.
  pub fn dir_name(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::Mac => "mac",
    }
  }
}

impl fmt::Display for PlatformFamily {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.dir_name())
  }
}
