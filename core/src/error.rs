// core/src/error.rs
use crate::pipeline::PipelineError;
use thiserror::Error;

/// Failure taxonomy shared by every store and workflow in the crate.
#[derive(Debug, Error)]
pub enum StoreError {
  /// A referenced product, order or address does not exist (or is not visible to the caller).
  #[error("Not found: {0}")]
  NotFound(String),

  /// A uniqueness or state constraint rejected the write.
  #[error("Conflict: {0}")]
  Conflict(String),

  /// The backend could not be reached or failed mid-request.
  #[error("Backend unavailable: {source}")]
  TransientIo {
    #[source]
    source: anyhow::Error,
  },

  #[error("Unauthorized: {0}")]
  Unauthorized(String),

  #[error("Validation failed: {0}")]
  Validation(String),

  /// Device-local storage could not be read or written.
  #[error("Local storage error: {0}")]
  Storage(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

/// Coarse category of a [`StoreError`], cheap to copy into notices and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  Conflict,
  TransientIo,
  Unauthorized,
  Validation,
  Storage,
  Internal,
}

impl StoreError {
  pub fn transient(source: impl Into<anyhow::Error>) -> Self {
    StoreError::TransientIo { source: source.into() }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      StoreError::NotFound(_) => ErrorKind::NotFound,
      StoreError::Conflict(_) => ErrorKind::Conflict,
      StoreError::TransientIo { .. } => ErrorKind::TransientIo,
      StoreError::Unauthorized(_) => ErrorKind::Unauthorized,
      StoreError::Validation(_) => ErrorKind::Validation,
      StoreError::Storage(_) => ErrorKind::Storage,
      StoreError::Internal(_) => ErrorKind::Internal,
    }
  }
}

impl From<PipelineError> for StoreError {
  fn from(err: PipelineError) -> Self {
    StoreError::Internal(err.to_string())
  }
}

impl From<serde_json::Error> for StoreError {
  fn from(err: serde_json::Error) -> Self {
    StoreError::Storage(err.to_string())
  }
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;
