//! Retry loop driven through the public executor API.

use std::path::PathBuf;
use std::time::Duration;

use envbuild_lib::execute::{BuildError, BuildRequest, CommandTemplate, RetryPolicy, build};
use envbuild_lib::log::LogContext;
use envbuild_lib::spec::EnvironmentSpec;

use super::common::{FlakyRunner, Workspace};

fn request_parts(ws: &Workspace) -> (EnvironmentSpec, PathBuf) {
  let path = ws.add_spec("foo", "abc123");
  let spec = EnvironmentSpec::from_path(&path).unwrap();
  (spec, ws.install_root().join("foo-1.5.x"))
}

#[tokio::test(start_paused = true)]
async fn sleeps_thirty_then_sixty_seconds() {
  let ws = Workspace::new();
  let (spec, prefix) = request_parts(&ws);
  let request = BuildRequest {
    spec: &spec,
    prefix: &prefix,
    working_dir: ws.temp.path(),
    force: false,
  };
  let runner = FlakyRunner::new(2);
  let template = CommandTemplate::parse("create {spec}").unwrap();

  let start = tokio::time::Instant::now();
  let outcome = build(&request, &template, &RetryPolicy::default(), &runner, &LogContext::default())
    .await
    .unwrap();

  assert_eq!(outcome.attempts, 3);
  assert_eq!(start.elapsed(), Duration::from_secs(30 + 60));
}

#[tokio::test(start_paused = true)]
async fn terminal_attempt_carries_stderr() {
  let ws = Workspace::new();
  let (spec, prefix) = request_parts(&ws);
  let request = BuildRequest {
    spec: &spec,
    prefix: &prefix,
    working_dir: ws.temp.path(),
    force: false,
  };
  let runner = FlakyRunner::never_succeeds();
  let template = CommandTemplate::parse("create {spec}").unwrap();
  let policy = RetryPolicy::new(2, Duration::from_secs(30));

  let err = build(&request, &template, &policy, &runner, &LogContext::default())
    .await
    .unwrap_err();

  assert_eq!(runner.calls.get(), 3);
  match err {
    BuildError::Terminal { stderr, code, .. } => {
      assert_eq!(code, Some(1));
      assert!(stderr.contains("CONNECTION FAILED"));
    }
    other => panic!("unexpected error: {other:?}"),
  }
}
