//! Batch orchestration.
//!
//! Builds every environment found in the platform subdirectory of a spec
//! directory, one after the other:
//! 1. Refuses to run when the batch marker exists, unless forced
//! 2. Discovers specs and applies the name filter
//! 3. Evaluates freshness for every selected spec before building anything,
//!    so configuration errors surface before the first external command
//! 4. Builds stale environments with retries and records their markers
//! 5. Writes the batch marker

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::DEFAULT_SPEC_EXT;
use crate::execute::{BuildError, BuildRequest, CommandRunner, CommandTemplate, RetryPolicy, build};
use crate::freshness::{Assessment, BuildDecision, FreshnessError, decide};
use crate::install::{InstallLayout, MarkerError, version_line, write_batch_marker, write_marker};
use crate::log::LogContext;
use crate::platform::PlatformFamily;
use crate::spec::{DiscoverError, EnvironmentSpec, discover, normalize_ext};

#[derive(Debug, Clone)]
pub struct BatchOptions {
  /// Directory holding one subdirectory of specs per platform family.
  pub spec_root: PathBuf,
  pub install_root: PathBuf,
  pub family: PlatformFamily,
  /// Version line used in install paths, e.g. `1.5.x`.
  pub version_line: String,
  /// Spec file extension filter.
  pub ext: String,
  /// Only build the environment with this name.
  pub env_name: Option<String>,
  /// Rebuild everything and ignore the batch marker.
  pub force: bool,
  /// Invoked by another tool rather than a person.
  pub automated: bool,
  /// Evaluate only; run nothing and write nothing.
  pub dry_run: bool,
  pub template: CommandTemplate,
  pub policy: RetryPolicy,
  /// Directory the build command runs in. Defaults to the current directory.
  pub working_dir: PathBuf,
}

impl BatchOptions {
  pub fn new(
    spec_root: impl Into<PathBuf>,
    install_root: impl Into<PathBuf>,
    family: PlatformFamily,
    template: CommandTemplate,
  ) -> Self {
    Self {
      spec_root: spec_root.into(),
      install_root: install_root.into(),
      working_dir: PathBuf::from("."),
      family,
      version_line: version_line(env!("CARGO_PKG_VERSION")),
      ext: DEFAULT_SPEC_EXT.to_string(),
      env_name: None,
      force: false,
      automated: false,
      dry_run: false,
      template,
      policy: RetryPolicy::default(),
    }
  }

  pub fn layout(&self) -> InstallLayout {
    InstallLayout::new(&self.install_root, &self.version_line)
  }

  /// Directory scanned for spec files.
  pub fn spec_dir(&self) -> PathBuf {
    self.spec_root.join(self.family.dir_name())
  }

  /// Whether the build command receives the overwrite flag.
  pub fn pass_force(&self) -> bool {
    self.force || self.automated
  }
}

#[derive(Debug, Error)]
pub enum BatchError {
  #[error("environments are already built in {}, will not rebuild without --force", .install_root.display())]
  AlreadyBuilt { install_root: PathBuf },

  #[error("unable to find *.{ext} files in {}, please verify", .dir.display())]
  NoSpecs { ext: String, dir: PathBuf },

  #[error(transparent)]
  Discover(#[from] DiscoverError),

  #[error(transparent)]
  Freshness(#[from] FreshnessError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Marker(#[from] MarkerError),
}

impl BatchError {
  /// Process exit status for this error.
  ///
  /// Terminal build failures keep the external command's own status.
  pub fn exit_code(&self) -> i32 {
    match self {
      Self::Build(err) => err.command_code().filter(|code| *code != 0).unwrap_or(1),
      _ => 1,
    }
  }
}

/// What happened to one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvReport {
  pub name: String,
  pub prefix: PathBuf,
  #[serde(flatten)]
  pub decision: BuildDecision,
  /// Build command invocations; zero when skipped or in a dry run.
  pub attempts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
  pub platform: String,
  pub version_line: String,
  pub dry_run: bool,
  pub envs: Vec<EnvReport>,
}

impl BatchSummary {
  pub fn built(&self) -> usize {
    self.envs.iter().filter(|e| e.attempts > 0).count()
  }

  pub fn skipped(&self) -> usize {
    self.envs.iter().filter(|e| !e.decision.needs_build()).count()
  }

  /// Environments that need a build, whether or not one ran.
  pub fn pending(&self) -> usize {
    self.envs.iter().filter(|e| e.decision.needs_build()).count()
  }

  pub fn invocations(&self) -> u32 {
    self.envs.iter().map(|e| e.attempts).sum()
  }
}

/// Build all stale environments described by `options`.
pub async fn run_batch<R: CommandRunner>(
  options: &BatchOptions,
  runner: &R,
  log: &LogContext,
) -> Result<BatchSummary, BatchError> {
  let layout = options.layout();

  if !options.force && layout.is_batch_built() {
    return Err(BatchError::AlreadyBuilt {
      install_root: layout.root().to_path_buf(),
    });
  }

  let spec_dir = options.spec_dir();
  let ext = normalize_ext(&options.ext);
  let specs = discover(&spec_dir, ext)?;
  if specs.is_empty() {
    return Err(BatchError::NoSpecs {
      ext: ext.to_string(),
      dir: spec_dir,
    });
  }

  let total = specs.len();
  let selected: Vec<(usize, &EnvironmentSpec)> = specs
    .iter()
    .enumerate()
    .filter(|(_, spec)| options.env_name.as_ref().is_none_or(|name| *name == spec.name))
    .collect();
  if let (Some(name), true) = (&options.env_name, selected.is_empty()) {
    warn!(env = %name, dir = %spec_dir.display(), "no environment matches the requested name, nothing to build");
  }

  let mut assessed: Vec<(usize, &EnvironmentSpec, Assessment)> = Vec::with_capacity(selected.len());
  for (index, spec) in selected {
    let assessment = decide(spec, &layout, options.force, log)?;
    assessed.push((index, spec, assessment));
  }

  let mut summary = BatchSummary {
    platform: options.family.to_string(),
    version_line: layout.version_line().to_string(),
    dry_run: options.dry_run,
    envs: Vec::with_capacity(assessed.len()),
  };

  for (index, spec, assessment) in assessed {
    let prefix = layout.env_prefix(&spec.name);
    let mut report = EnvReport {
      name: spec.name.clone(),
      prefix: prefix.clone(),
      decision: assessment.decision,
      attempts: 0,
    };

    if !assessment.decision.needs_build() {
      log.notice(format_args!(
        "Existing env ({}) found, skipping unless --force is used",
        prefix.display()
      ));
      summary.envs.push(report);
      continue;
    }

    log.info(format_args!(
      "Found {} ({} of {}), begin build to {}",
      spec.path.display(),
      index + 1,
      total,
      prefix.display()
    ));

    if options.dry_run {
      debug!(env = %spec.name, decision = %assessment.decision, "dry run, not building");
      summary.envs.push(report);
      continue;
    }

    let request = BuildRequest {
      spec,
      prefix: &prefix,
      working_dir: &options.working_dir,
      force: options.pass_force(),
    };
    let outcome = build(&request, &options.template, &options.policy, runner, log).await?;
    write_marker(&layout.marker_path(&spec.name), &assessment.expected)?;
    info!(env = %spec.name, attempts = outcome.attempts, "environment built");

    report.attempts = outcome.attempts;
    summary.envs.push(report);
  }

  if !options.dry_run {
    write_batch_marker(&layout.batch_marker_path(), layout.version_line())?;
  }

  Ok(summary)
}
