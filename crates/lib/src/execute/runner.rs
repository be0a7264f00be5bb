//! External command runner.
//!
//! The build command is an opaque shell command line. [`CommandRunner`] is the
//! seam between the retry loop and the process, so tests can script outcomes
//! without spawning anything.

use std::future::Future;
use std::io;
use std::path::Path;

use tokio::process::Command;
use tracing::debug;

/// Captured result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
  /// Exit status, `None` when the process was killed by a signal.
  pub code: Option<i32>,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

pub trait CommandRunner {
  /// Run `command_line` in `working_dir`, capturing both output streams.
  ///
  /// A non-zero exit is reported through [`CommandOutput::code`]; `Err` is
  /// reserved for failures to start the command at all.
  fn run(&self, command_line: &str, working_dir: &Path) -> impl Future<Output = io::Result<CommandOutput>>;
}

/// Shell used to run build command lines.
const SHELL: &str = "/bin/sh";

/// Runs command lines through `/bin/sh -c`.
///
/// The build command inherits the caller's environment: package managers
/// rely on `PATH` and their own config.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
  pub fn new() -> Self {
    Self
  }
}

impl CommandRunner for ShellRunner {
  async fn run(&self, command_line: &str, working_dir: &Path) -> io::Result<CommandOutput> {
    debug!(shell = SHELL, working_dir = ?working_dir, cmd = %command_line, "spawning process");

    let output = Command::new(SHELL)
      .arg("-c")
      .arg(command_line)
      .current_dir(working_dir)
      .output()
      .await?;

    Ok(CommandOutput {
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
      code: output.status.code(),
    })
  }
}
