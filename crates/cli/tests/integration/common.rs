//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Creates the prefix directory and drops a file into it.
pub const TOUCH_COMMAND: &str = "mkdir -p {prefix} && touch {prefix}/ready";

/// Spec subdirectory picked up on the host running the tests.
pub fn platform_dir() -> &'static str {
  if cfg!(target_os = "macos") { "mac" } else { "linux" }
}

/// Version line the binary installs under, e.g. `0.1.x`.
pub fn version_line() -> String {
  let mut parts = env!("CARGO_PKG_VERSION").split('.');
  let major = parts.next().unwrap_or("0");
  let minor = parts.next().unwrap_or("0");
  format!("{}.{}.x", major, minor)
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the spec tree and the
/// install root.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Root of the spec tree (contains `linux/` and `mac/`).
  pub fn spec_root(&self) -> PathBuf {
    self.temp.path().join("envs")
  }

  pub fn install_root(&self) -> PathBuf {
    let p = self.temp.path().join("install");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Write `<name>.yml` and `<name>.md5` for the current platform.
  pub fn add_spec(&self, name: &str, fingerprint: &str) {
    let dir = self.spec_root().join(platform_dir());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{}.yml", name)), format!("name: {}\n", name)).unwrap();
    std::fs::write(dir.join(format!("{}.md5", name)), format!("{}\n", fingerprint)).unwrap();
  }

  pub fn prefix(&self, name: &str) -> PathBuf {
    self.install_root().join(format!("{}-{}", name, version_line()))
  }

  pub fn marker(&self, name: &str) -> PathBuf {
    self.prefix(name).join("env-built.txt")
  }

  pub fn batch_marker(&self) -> PathBuf {
    self.install_root().join(format!("envs-build-{}.txt", version_line()))
  }

  /// A file in the temp dir that commands can use as scratch state.
  pub fn scratch(&self, name: &str) -> PathBuf {
    self.temp.path().join(name)
  }

  /// Get a pre-configured Command for the envbuild binary.
  ///
  /// Disables the retry backoff and clears any inherited command override.
  pub fn envbuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("envbuild");
    cmd.env("ENVBUILD_BACKOFF_SECS", "0");
    cmd.env_remove("ENVBUILD_COMMAND");
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(self.temp.path());
    cmd
  }

  /// `envbuild <spec_root> <install_root> --command <command>`.
  pub fn build_cmd(&self, command: &str) -> Command {
    let mut cmd = self.envbuild_cmd();
    cmd
      .arg(self.spec_root())
      .arg(self.install_root())
      .arg("--command")
      .arg(command);
    cmd
  }
}

pub fn read(path: &Path) -> String {
  std::fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}
