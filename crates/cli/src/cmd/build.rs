//! Implementation of the build run.
//!
//! Resolves paths and configuration, runs the batch on a tokio runtime and
//! prints the summary.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use envbuild_lib::batch::{BatchError, BatchOptions, BatchSummary, run_batch};
use envbuild_lib::config;
use envbuild_lib::execute::{BuildError, CommandTemplate, RetryPolicy, ShellRunner};
use envbuild_lib::log::{LogContext, Verbosity};
use envbuild_lib::platform::PlatformFamily;

use crate::output::{
  OutputFormat, decision_symbol, format_duration, print_info, print_json, print_stat, print_success,
};

/// Resolved command-line arguments for a build run.
#[derive(Debug, Clone)]
pub struct BuildArgs {
  pub spec_dir: PathBuf,
  pub install_dir: PathBuf,
  pub ext: String,
  pub env_name: Option<String>,
  pub force: bool,
  pub automated: bool,
  pub max_retries: u32,
  pub command: Option<String>,
  pub dry_run: bool,
  pub output: OutputFormat,
  pub verbosity: Verbosity,
}

/// Execute a build run.
///
/// Errors are returned as [`BatchError`] where possible so the caller can
/// map them to an exit status.
pub fn cmd_build(args: &BuildArgs) -> Result<()> {
  let start = Instant::now();

  let family = PlatformFamily::detect()?;
  let template_src = args.command.clone().unwrap_or_else(config::command_template);
  let template = CommandTemplate::parse(&template_src)?;

  let mut options = BatchOptions::new(
    absolute(&args.spec_dir)?,
    absolute(&args.install_dir)?,
    family,
    template,
  );
  options.ext = args.ext.clone();
  options.env_name = args.env_name.clone();
  options.force = args.force;
  options.automated = args.automated;
  options.dry_run = args.dry_run;
  options.policy = RetryPolicy::new(args.max_retries, config::backoff_unit());
  options.working_dir = std::env::current_dir().context("Failed to determine current directory")?;

  debug!(
    spec_dir = %options.spec_dir().display(),
    install_root = %options.install_root.display(),
    version_line = %options.version_line,
    cmd = %options.template.as_str(),
    "starting build run"
  );

  let log = LogContext::new(args.verbosity).with_notices(!args.automated);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let summary = match rt.block_on(run_batch(&options, &ShellRunner::new(), &log)) {
    Ok(summary) => summary,
    Err(err) => {
      // Let the build tool speak for itself before our own message.
      if let BatchError::Build(BuildError::Terminal { stderr, .. }) = &err {
        eprint!("{}", stderr);
      }
      return Err(err.into());
    }
  };

  if args.output.is_json() {
    print_json(&summary)?;
  } else if args.verbosity != Verbosity::Silent {
    print_summary(&summary, start, args.verbosity == Verbosity::Verbose);
  }

  Ok(())
}

fn print_summary(summary: &BatchSummary, start: Instant, verbose: bool) {
  println!();
  if summary.dry_run {
    print_info(&format!(
      "Dry run - {} environment(s) would be built, {} up to date",
      summary.pending(),
      summary.skipped()
    ));
  } else {
    print_success(&format!(
      "Built {} environment(s), {} up to date",
      summary.built(),
      summary.skipped()
    ));
  }

  if verbose || summary.dry_run {
    for env in &summary.envs {
      println!(
        "  {} {} ({})",
        decision_symbol(env.decision),
        env.prefix.display(),
        env.decision
      );
    }
  }

  print_stat("Platform", &summary.platform);
  print_stat("Version", &summary.version_line);
  if !summary.dry_run {
    print_stat("Build invocations", &summary.invocations().to_string());
  }
  print_stat("Duration", &format_duration(start.elapsed()));
}

fn absolute(path: &Path) -> Result<PathBuf> {
  let abs = std::path::absolute(path).with_context(|| format!("Failed to resolve {}", path.display()))?;
  Ok(dunce::simplified(&abs).to_path_buf())
}

/// Exit status for an error returned by [`cmd_build`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
  err.downcast_ref::<BatchError>().map_or(1, BatchError::exit_code)
}
