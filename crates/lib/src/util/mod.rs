//! Shared utilities.
//!
//! Test helpers for building spec trees and faking the external command.

#[cfg(test)]
pub mod testutil;
