//! Configuration for spawned worker threads.
//!
//! A `LaunchConfig` can be built in code or read from YAML:
//!
//! ```yaml
//! thread_name_prefix: "ingest"
//! stack_size: 262144
//! ```

use std::fs;
use std::path::Path;
use std::thread;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_THREAD_NAME_PREFIX: &str = "cohort-worker";

/// Errors raised while loading or validating a [`LaunchConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read configuration file: {0}")]
  Read(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  Parse(String),

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidValue { field: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
  /// Worker threads are named `{prefix}-{index}`.
  pub thread_name_prefix: String,
  /// Stack size in bytes for each worker thread. `None` uses the platform
  /// default.
  pub stack_size: Option<usize>,
}

impl Default for LaunchConfig {
  fn default() -> Self {
    Self {
      thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
      stack_size: None,
    }
  }
}

impl LaunchConfig {
  pub fn builder() -> LaunchConfigBuilder {
    LaunchConfigBuilder::default()
  }

  /// Parses and validates a YAML document.
  pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
    let config: LaunchConfig =
      serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  /// Reads, parses and validates a YAML file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let source = fs::read_to_string(path)?;
    Self::from_yaml_str(&source)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.thread_name_prefix.is_empty() {
      return Err(ConfigError::InvalidValue {
        field: "thread_name_prefix".into(),
        message: "must not be empty".into(),
      });
    }
    // std refuses to spawn a thread whose name contains a NUL byte.
    if self.thread_name_prefix.contains('\0') {
      return Err(ConfigError::InvalidValue {
        field: "thread_name_prefix".into(),
        message: "must not contain NUL bytes".into(),
      });
    }
    if self.stack_size == Some(0) {
      return Err(ConfigError::InvalidValue {
        field: "stack_size".into(),
        message: "must be greater than zero".into(),
      });
    }
    Ok(())
  }

  pub(crate) fn thread_builder(&self, index: usize) -> thread::Builder {
    let builder = thread::Builder::new().name(format!("{}-{}", self.thread_name_prefix, index));
    match self.stack_size {
      Some(size) => builder.stack_size(size),
      None => builder,
    }
  }
}

#[derive(Debug, Default)]
pub struct LaunchConfigBuilder {
  thread_name_prefix: Option<String>,
  stack_size: Option<usize>,
}

impl LaunchConfigBuilder {
  pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.thread_name_prefix = Some(prefix.into());
    self
  }

  pub fn stack_size(mut self, bytes: usize) -> Self {
    self.stack_size = Some(bytes);
    self
  }

  pub fn build(self) -> Result<LaunchConfig, ConfigError> {
    let defaults = LaunchConfig::default();
    let config = LaunchConfig {
      thread_name_prefix: self
        .thread_name_prefix
        .unwrap_or(defaults.thread_name_prefix),
      stack_size: self.stack_size.or(defaults.stack_size),
    };
    config.validate()?;
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn builder_fills_defaults() {
    let config = LaunchConfig::builder().build().unwrap();
    assert_eq!(config, LaunchConfig::default());

    let config = LaunchConfig::builder()
      .thread_name_prefix("ingest")
      .stack_size(64 * 1024)
      .build()
      .unwrap();
    assert_eq!(config.thread_name_prefix, "ingest");
    assert_eq!(config.stack_size, Some(64 * 1024));
  }

  #[test]
  fn builder_rejects_invalid_values() {
    let err = LaunchConfig::builder()
      .thread_name_prefix("")
      .build()
      .unwrap_err();
    assert!(matches!(
      err,
      ConfigError::InvalidValue { ref field, .. } if field == "thread_name_prefix"
    ));

    let err = LaunchConfig::builder().stack_size(0).build().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "stack_size"));
  }

  #[test]
  fn yaml_partial_document_uses_defaults() {
    let config = LaunchConfig::from_yaml_str("stack_size: 131072\n").unwrap();
    assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    assert_eq!(config.stack_size, Some(131072));
  }

  #[test]
  fn yaml_unknown_field_is_a_parse_error() {
    let err = LaunchConfig::from_yaml_str("workers: 4\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn from_file_reads_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "thread_name_prefix: \"resize\"").unwrap();
    let config = LaunchConfig::from_file(file.path()).unwrap();
    assert_eq!(config.thread_name_prefix, "resize");
  }

  #[test]
  fn from_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LaunchConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read(_)));
  }
}
