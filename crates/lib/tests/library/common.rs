//! Shared helpers for library integration tests.

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use envbuild_lib::batch::BatchOptions;
use envbuild_lib::execute::{CommandOutput, CommandRunner, CommandTemplate, RetryPolicy};
use envbuild_lib::platform::PlatformFamily;
use tempfile::TempDir;

/// Spec tree plus install root in one temp directory.
pub struct Workspace {
  pub temp: TempDir,
}

impl Workspace {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn spec_root(&self) -> PathBuf {
    self.temp.path().join("envs")
  }

  pub fn install_root(&self) -> PathBuf {
    self.temp.path().join("install")
  }

  /// Add a Linux spec with its fingerprint.
  pub fn add_spec(&self, name: &str, fingerprint: &str) -> PathBuf {
    let dir = self.spec_root().join("linux");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.yml", name));
    fs::write(&path, format!("name: {}\n", name)).unwrap();
    fs::write(dir.join(format!("{}.md5", name)), format!("{}\n", fingerprint)).unwrap();
    path
  }

  pub fn options(&self, template: &str, max_retries: u32) -> BatchOptions {
    let mut options = BatchOptions::new(
      self.spec_root(),
      self.install_root(),
      PlatformFamily::Linux,
      CommandTemplate::parse(template).unwrap(),
    );
    options.version_line = "1.5.x".to_string();
    options.working_dir = self.temp.path().to_path_buf();
    options.policy = RetryPolicy::new(max_retries, Duration::ZERO);
    options
  }
}

/// Runner that fails a fixed number of times, then succeeds.
pub struct FlakyRunner {
  failures_left: Cell<u32>,
  pub calls: Cell<u32>,
}

impl FlakyRunner {
  pub fn new(failures: u32) -> Self {
    Self {
      failures_left: Cell::new(failures),
      calls: Cell::new(0),
    }
  }

  pub fn never_succeeds() -> Self {
    Self::new(u32::MAX)
  }
}

impl CommandRunner for FlakyRunner {
  async fn run(&self, _command_line: &str, _working_dir: &Path) -> io::Result<CommandOutput> {
    self.calls.set(self.calls.get() + 1);
    let left = self.failures_left.get();
    if left > 0 {
      self.failures_left.set(left - 1);
      return Ok(CommandOutput {
        stdout: String::new(),
        stderr: "CondaHTTPError: HTTP 000 CONNECTION FAILED\n".to_string(),
        code: Some(1),
      });
    }
    Ok(CommandOutput {
      stdout: "Preparing transaction: done\n".to_string(),
      stderr: String::new(),
      code: Some(0),
    })
  }
}
