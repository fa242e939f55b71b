use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for the transform pipeline.
#[derive(Debug, Error)]
pub enum TransformError {
  #[error("Cache error: {0}")]
  Cache(#[from] CacheError),

  #[error("Rendering error: {0}")]
  Render(String),

  #[error("Extension '{name}' rejected its arguments: {reason}")]
  Extension { name: String, reason: String },

  #[error("Failed to read {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Error type for content cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
  #[error("Invalid cache entry name '{0}'")]
  InvalidName(String),

  #[error("Cache I/O error at {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Cache lock poisoned")]
  Poisoned,
}

impl CacheError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;
