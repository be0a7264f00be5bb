//! Library integration tests for envbuild-lib.

mod common;
mod executor_tests;
