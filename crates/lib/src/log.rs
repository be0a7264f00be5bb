//! Logging context passed to the evaluator and executor.
//!
//! Captured output of the external build command is reported on two extra
//! severities, `STDOUT` and `STDERR`, that are only rendered at verbose level.
//! They are emitted as `tracing` debug events under dedicated targets so the
//! subscriber can still filter them like any other event.

use std::fmt;

use tracing::{debug, info};

/// Effective verbosity of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
  /// Only errors.
  Silent,
  #[default]
  Normal,
  /// Debug output, including captured command streams.
  Verbose,
}

impl Verbosity {
  pub fn from_flags(verbose: bool, silent: bool) -> Self {
    if silent {
      Self::Silent
    } else if verbose {
      Self::Verbose
    } else {
      Self::Normal
    }
  }

  /// Directive for `tracing_subscriber::EnvFilter`.
  pub fn filter_directive(self) -> &'static str {
    match self {
      Self::Silent => "error",
      Self::Normal => "info",
      Self::Verbose => "debug",
    }
  }
}

/// Severity used for a captured stream of the external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamSeverity {
  /// Numeric level, between debug (10) and info (20).
  pub value: u8,
  pub name: &'static str,
}

impl fmt::Display for StreamSeverity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

pub const STDOUT: StreamSeverity = StreamSeverity { value: 11, name: "STDOUT" };
pub const STDERR: StreamSeverity = StreamSeverity { value: 12, name: "STDERR" };

pub const STDOUT_TARGET: &str = "envbuild::stdout";
pub const STDERR_TARGET: &str = "envbuild::stderr";

/// Explicit logging state for one run.
///
/// Automated callers turn off notices, the informational messages that only
/// matter to a person at a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogContext {
  verbosity: Verbosity,
  notices: bool,
}

impl Default for LogContext {
  fn default() -> Self {
    Self::new(Verbosity::Normal)
  }
}

impl LogContext {
  pub fn new(verbosity: Verbosity) -> Self {
    Self {
      verbosity,
      notices: true,
    }
  }

  pub fn with_notices(mut self, notices: bool) -> Self {
    self.notices = notices;
    self
  }

  pub fn is_verbose(&self) -> bool {
    self.verbosity == Verbosity::Verbose
  }

  pub fn is_silent(&self) -> bool {
    self.verbosity == Verbosity::Silent
  }

  /// Progress message at info level.
  pub fn info(&self, message: impl fmt::Display) {
    if !self.is_silent() {
      info!("{}", message);
    }
  }

  /// Like [`LogContext::info`], but dropped for automated callers.
  pub fn notice(&self, message: impl fmt::Display) {
    if self.notices {
      self.info(message);
    }
  }

  /// Whether a stream severity would be rendered in this context.
  pub fn renders(&self, _severity: StreamSeverity) -> bool {
    self.is_verbose()
  }

  /// Emit text at one of the stream severities.
  ///
  /// Empty text and non-verbose contexts emit nothing.
  pub fn stream(&self, severity: StreamSeverity, text: &str) {
    let text = text.trim_end();
    if text.is_empty() || !self.renders(severity) {
      return;
    }

    if severity == STDERR {
      debug!(target: STDERR_TARGET, stream = severity.name, level = severity.value, "{}", text);
    } else {
      debug!(target: STDOUT_TARGET, stream = severity.name, level = severity.value, "{}", text);
    }
  }
}
