//! Build execution.
//!
//! This module runs the external build command for a single environment:
//! - [`command`]: rendering the command line from a template
//! - [`runner`]: the process seam ([`CommandRunner`]) and the shell-backed runner
//! - [`retry`]: the bounded retry loop with linear backoff

pub mod command;
pub mod retry;
pub mod runner;

pub use command::{CommandError, CommandTemplate};
pub use retry::{BuildError, BuildOutcome, BuildRequest, BuildState, RetryPolicy, build};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
