//! Freshness evaluation.
//!
//! Decides whether an environment must be (re)built. The build marker is the
//! only state that is trusted: an existing prefix directory without a
//! matching marker still needs a build, since a previous attempt may have
//! died halfway.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::install::{InstallLayout, MarkerError, read_marker};
use crate::log::LogContext;
use crate::spec::{EnvironmentSpec, Fingerprint, FingerprintError};

/// Why an environment needs a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildReason {
  /// No build marker was recorded.
  MissingMarker,
  /// The marker records a different fingerprint.
  OutOfSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum BuildDecision {
  /// Marker matches the fingerprint.
  Skip,
  Rebuild(RebuildReason),
  /// Rebuild requested explicitly.
  Forced,
}

impl BuildDecision {
  pub fn needs_build(&self) -> bool {
    !matches!(self, Self::Skip)
  }
}

impl fmt::Display for BuildDecision {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Skip => write!(f, "up to date"),
      Self::Rebuild(RebuildReason::MissingMarker) => write!(f, "not built"),
      Self::Rebuild(RebuildReason::OutOfSync) => write!(f, "out of sync"),
      Self::Forced => write!(f, "forced"),
    }
  }
}

#[derive(Debug, Error)]
pub enum FreshnessError {
  #[error("environment '{name}': {source}")]
  Fingerprint {
    name: String,
    #[source]
    source: FingerprintError,
  },

  #[error("environment '{name}': {source}")]
  Marker {
    name: String,
    #[source]
    source: MarkerError,
  },
}

/// Outcome of evaluating one spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
  pub decision: BuildDecision,
  /// Fingerprint to record once a build succeeds.
  pub expected: Fingerprint,
}

/// Compare an expected fingerprint against the marker at `marker_path`.
pub fn evaluate(expected: &Fingerprint, marker_path: &Path, force: bool) -> Result<BuildDecision, MarkerError> {
  if force {
    return Ok(BuildDecision::Forced);
  }

  Ok(match read_marker(marker_path)? {
    None => BuildDecision::Rebuild(RebuildReason::MissingMarker),
    Some(current) if current == *expected => BuildDecision::Skip,
    Some(_) => BuildDecision::Rebuild(RebuildReason::OutOfSync),
  })
}

/// Decide whether `spec` needs a build under `layout`.
///
/// The spec's fingerprint file is read even when `force` is set, so a
/// missing fingerprint is reported before any build starts.
pub fn decide(
  spec: &EnvironmentSpec,
  layout: &InstallLayout,
  force: bool,
  log: &LogContext,
) -> Result<Assessment, FreshnessError> {
  let expected = spec.fingerprint().map_err(|source| FreshnessError::Fingerprint {
    name: spec.name.clone(),
    source,
  })?;

  let marker_path = layout.marker_path(&spec.name);
  let decision = evaluate(&expected, &marker_path, force).map_err(|source| FreshnessError::Marker {
    name: spec.name.clone(),
    source,
  })?;

  if decision == BuildDecision::Rebuild(RebuildReason::OutOfSync) {
    log.info(format_args!(
      "Existing env ({}) is out of sync, it will be updated",
      layout.env_prefix(&spec.name).display()
    ));
  }
  debug!(env = %spec.name, fingerprint = %expected, decision = %decision, "freshness evaluated");

  Ok(Assessment { decision, expected })
}
