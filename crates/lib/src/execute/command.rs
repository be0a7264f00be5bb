//! Build command templates.
//!
//! A template is a shell command line with three placeholders:
//! - `{spec}`: path of the specification file
//! - `{prefix}`: install prefix of the environment
//! - `{force}`: `--force` when overwriting was requested, empty otherwise
//!
//! Paths are shell-quoted before substitution.

use std::path::{Path, PathBuf};

use thiserror::Error;

const SPEC_PLACEHOLDER: &str = "{spec}";
const PREFIX_PLACEHOLDER: &str = "{prefix}";
const FORCE_PLACEHOLDER: &str = "{force}";
const FORCE_FLAG: &str = "--force";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
  #[error("build command template is empty")]
  EmptyTemplate,

  #[error("path cannot be passed to the build command: {0}")]
  UnquotablePath(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(String);

impl CommandTemplate {
  pub fn parse(template: &str) -> Result<Self, CommandError> {
    let template = template.trim();
    if template.is_empty() {
      return Err(CommandError::EmptyTemplate);
    }
    Ok(Self(template.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Produce the command line for one build.
  ///
  /// The template is scanned once, so placeholder text inside a substituted
  /// path is left alone.
  pub fn render(&self, spec: &Path, prefix: &Path, force: bool) -> Result<String, CommandError> {
    let spec = quote(spec)?;
    let prefix = quote(prefix)?;
    let force = if force { FORCE_FLAG } else { "" };
    let placeholders = [
      (SPEC_PLACEHOLDER, spec.as_str()),
      (PREFIX_PLACEHOLDER, prefix.as_str()),
      (FORCE_PLACEHOLDER, force),
    ];

    let mut rendered = String::with_capacity(self.0.len() + spec.len() + prefix.len());
    let mut rest = self.0.as_str();
    while let Some(open) = rest.find('{') {
      rendered.push_str(&rest[..open]);
      rest = &rest[open..];
      match placeholders.iter().find(|(name, _)| rest.starts_with(name)) {
        Some((name, value)) => {
          rendered.push_str(value);
          rest = &rest[name.len()..];
        }
        None => {
          rendered.push('{');
          rest = &rest[1..];
        }
      }
    }
    rendered.push_str(rest);
    Ok(rendered.trim_end().to_string())
  }
}

fn quote(path: &Path) -> Result<String, CommandError> {
  let unquotable = || CommandError::UnquotablePath(path.to_path_buf());
  let raw = path.to_str().ok_or_else(unquotable)?;
  shlex::try_quote(raw).map(|q| q.into_owned()).map_err(|_| unquotable())
}
