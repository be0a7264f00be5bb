//! Test utilities for envbuild-lib.
//!
//! Helpers to lay out spec directories and a scripted [`CommandRunner`] that
//! never spawns a process.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::execute::{CommandOutput, CommandRunner};
use crate::spec::EnvironmentSpec;

/// Write `<dir>/<name>.<ext>` and its `<name>.md5` fingerprint.
pub fn write_spec(dir: &Path, name: &str, ext: &str, fingerprint: &str) -> EnvironmentSpec {
  fs::create_dir_all(dir).unwrap();
  let path = dir.join(format!("{}.{}", name, ext));
  fs::write(&path, format!("name: {}\ndependencies: []\n", name)).unwrap();
  fs::write(dir.join(format!("{}.md5", name)), format!("{}\n", fingerprint)).unwrap();
  EnvironmentSpec::from_path(&path).unwrap()
}

/// Runner that replays scripted outcomes and records every invocation.
///
/// Once the script is exhausted the last outcome repeats.
pub struct ScriptedRunner {
  outcomes: RefCell<VecDeque<CommandOutput>>,
  last: RefCell<Option<CommandOutput>>,
  pub calls: RefCell<Vec<(String, PathBuf)>>,
}

impl ScriptedRunner {
  pub fn new(outcomes: Vec<CommandOutput>) -> Self {
    Self {
      outcomes: RefCell::new(outcomes.into()),
      last: RefCell::new(None),
      calls: RefCell::new(Vec::new()),
    }
  }

  pub fn always_ok() -> Self {
    Self::new(vec![ok()])
  }

  pub fn always_failing(code: i32) -> Self {
    Self::new(vec![failed(code)])
  }

  /// Fail `failures` times, then succeed.
  pub fn failing_then_ok(failures: usize) -> Self {
    let mut outcomes: Vec<_> = (0..failures).map(|_| failed(1)).collect();
    outcomes.push(ok());
    Self::new(outcomes)
  }

  pub fn call_count(&self) -> usize {
    self.calls.borrow().len()
  }

  pub fn commands(&self) -> Vec<String> {
    self.calls.borrow().iter().map(|(cmd, _)| cmd.clone()).collect()
  }
}

impl CommandRunner for ScriptedRunner {
  async fn run(&self, command_line: &str, working_dir: &Path) -> io::Result<CommandOutput> {
    self
      .calls
      .borrow_mut()
      .push((command_line.to_string(), working_dir.to_path_buf()));

    let next = self.outcomes.borrow_mut().pop_front();
    let outcome = match next {
      Some(outcome) => {
        *self.last.borrow_mut() = Some(outcome.clone());
        outcome
      }
      None => self.last.borrow().clone().unwrap_or_else(ok),
    };
    Ok(outcome)
  }
}

pub fn ok() -> CommandOutput {
  CommandOutput {
    stdout: "done\n".to_string(),
    stderr: String::new(),
    code: Some(0),
  }
}

pub fn failed(code: i32) -> CommandOutput {
  CommandOutput {
    stdout: String::new(),
    stderr: format!("solver failed with {}\n", code),
    code: Some(code),
  }
}
