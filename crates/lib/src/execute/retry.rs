//! Bounded retry loop for one environment build.
//!
//! A build walks a small state machine:
//!
//! ```text
//! Pending -> Running(1) -> Succeeded(n)
//!                       -> FailedRetry(n) -> (sleep unit * n) -> Running(n + 1)
//!                       -> FailedTerminal(n)
//! ```
//!
//! Attempt `max_retries + 1` is the terminal one: when it fails, the loop stops
//! and the command's own exit status and stderr are handed to the caller.

use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

use super::command::{CommandError, CommandTemplate};
use super::runner::{CommandOutput, CommandRunner};
use crate::consts::{DEFAULT_BACKOFF_SECS, DEFAULT_MAX_RETRIES};
use crate::log::{LogContext, STDERR, STDOUT};
use crate::spec::EnvironmentSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Failed attempts that are followed by another try.
  pub max_retries: u32,
  /// Backoff multiplied by the number of the failed attempt.
  pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries: DEFAULT_MAX_RETRIES,
      backoff_unit: Duration::from_secs(DEFAULT_BACKOFF_SECS),
    }
  }
}

impl RetryPolicy {
  pub fn new(max_retries: u32, backoff_unit: Duration) -> Self {
    Self {
      max_retries,
      backoff_unit,
    }
  }

  /// Total number of invocations before giving up.
  pub fn max_attempts(&self) -> u32 {
    self.max_retries.saturating_add(1)
  }

  /// Sleep after failed attempt `attempt` (1-based).
  pub fn delay_after(&self, attempt: u32) -> Duration {
    self.backoff_unit.saturating_mul(attempt)
  }

  pub fn is_terminal(&self, attempt: u32) -> bool {
    attempt >= self.max_attempts()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
  Pending,
  Running { attempt: u32 },
  FailedRetry { attempt: u32 },
  Succeeded { attempt: u32 },
  FailedTerminal { attempt: u32, code: Option<i32> },
}

impl BuildState {
  pub fn is_final(&self) -> bool {
    matches!(self, Self::Succeeded { .. } | Self::FailedTerminal { .. })
  }
}

/// Inputs for one build.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
  pub spec: &'a EnvironmentSpec,
  pub prefix: &'a Path,
  pub working_dir: &'a Path,
  /// Pass the overwrite flag to the build command.
  pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOutcome {
  /// Invocations it took, including the successful one.
  pub attempts: u32,
}

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("building '{name}' failed after {attempts} attempt(s) (exit code {})", fmt_code(.code))]
  Terminal {
    name: String,
    attempts: u32,
    code: Option<i32>,
    /// Captured stderr of the terminal attempt.
    stderr: String,
  },

  #[error("failed to start build command for '{name}': {source}")]
  Spawn {
    name: String,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Command(#[from] CommandError),
}

impl BuildError {
  /// Exit status of the external command, when there is one.
  pub fn command_code(&self) -> Option<i32> {
    match self {
      Self::Terminal { code, .. } => *code,
      _ => None,
    }
  }
}

fn fmt_code(code: &Option<i32>) -> String {
  code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Run the build command for one environment, retrying on failure.
///
/// Writing the build marker is left to the caller; this only reports whether
/// the command eventually succeeded.
pub async fn build<R: CommandRunner>(
  request: &BuildRequest<'_>,
  template: &CommandTemplate,
  policy: &RetryPolicy,
  runner: &R,
  log: &LogContext,
) -> Result<BuildOutcome, BuildError> {
  let name = &request.spec.name;
  let command_line = template.render(&request.spec.path, request.prefix, request.force)?;

  let mut state = BuildState::Pending;
  let mut last_output: Option<CommandOutput> = None;

  loop {
    state = match state {
      BuildState::Pending => BuildState::Running { attempt: 1 },

      BuildState::Running { attempt } => {
        debug!(env = %name, attempt, max_attempts = policy.max_attempts(), cmd = %command_line, "running build command");

        let output = runner
          .run(&command_line, request.working_dir)
          .await
          .map_err(|source| BuildError::Spawn {
            name: name.clone(),
            source,
          })?;

        log.stream(STDOUT, &output.stdout);
        log.stream(STDERR, &output.stderr);

        let next = if output.success() {
          BuildState::Succeeded { attempt }
        } else if policy.is_terminal(attempt) {
          BuildState::FailedTerminal {
            attempt,
            code: output.code,
          }
        } else {
          BuildState::FailedRetry { attempt }
        };
        last_output = Some(output);
        next
      }

      BuildState::FailedRetry { attempt } => {
        let delay = policy.delay_after(attempt);
        log.stream(STDERR, "Error creating environment, retrying after short sleep.");
        debug!(env = %name, attempt, delay = ?delay, "build attempt failed");
        tokio::time::sleep(delay).await;
        BuildState::Running { attempt: attempt + 1 }
      }

      BuildState::Succeeded { attempt } => {
        debug!(env = %name, attempts = attempt, "build command succeeded");
        return Ok(BuildOutcome { attempts: attempt });
      }

      BuildState::FailedTerminal { attempt, code } => {
        let stderr = last_output.take().map(|o| o.stderr).unwrap_or_default();
        error!(env = %name, attempts = attempt, code = ?code, "build command failed, giving up");
        return Err(BuildError::Terminal {
          name: name.clone(),
          attempts: attempt,
          code,
          stderr,
        });
      }
    };
  }
}
