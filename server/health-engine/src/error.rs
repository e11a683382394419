//! Structured error types for the health engine and its data source seam.

use thiserror::Error;

/// Failure reported by a data source for one fetch.
#[derive(Debug, Error)]
pub enum SourceError {
  #[error("{resource}: not available")]
  Unavailable { resource: String },

  #[error("{resource}: {reason}")]
  Request { resource: String, reason: String },
}

impl SourceError {
  pub fn unavailable(resource: &str) -> Self {
    Self::Unavailable {
      resource: resource.to_string(),
    }
  }

  pub fn request(resource: &str, reason: impl Into<String>) -> Self {
    Self::Request {
      resource: resource.to_string(),
      reason: reason.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum EngineError {
  /// A required fetch failed; the run is aborted.
  #[error("fetch {stage}: {source}")]
  Fetch {
    stage: &'static str,
    source: SourceError,
  },

  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn fetch(stage: &'static str, source: SourceError) -> Self {
    Self::Fetch { stage, source }
  }

  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }
}
