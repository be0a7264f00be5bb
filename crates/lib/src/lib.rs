//! envbuild-lib: freshness checks and retrying builds for isolated environments
//!
//! This crate provides the pieces behind the `envbuild` binary:
//! - `spec`: discovery of environment specification files and their fingerprints
//! - `install`: install-tree layout and build markers
//! - `freshness`: the skip/rebuild/forced decision for one environment
//! - `execute`: the external command runner and the bounded retry loop
//! - `batch`: sequential orchestration over a directory of specs

pub mod batch;
pub mod config;
pub mod consts;
pub mod execute;
pub mod freshness;
pub mod install;
pub mod log;
pub mod platform;
pub mod spec;
pub mod util;
