// core/src/cart/notice.rs

use crate::error::{ErrorKind, StoreError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
  Info,
  Error,
}

/// A non-blocking, toast-style message about the outcome of a cart action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
  pub level: NoticeLevel,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error_kind: Option<ErrorKind>,
}

impl Notice {
  pub fn info(message: impl Into<String>) -> Self {
    Self {
      level: NoticeLevel::Info,
      message: message.into(),
      error_kind: None,
    }
  }

  pub fn from_error(action: &str, err: &StoreError) -> Self {
    let message = match err {
      StoreError::NotFound(_) => format!("{}: that item is no longer available", action),
      StoreError::Unauthorized(_) => format!("{}: please sign in again", action),
      StoreError::TransientIo { .. } => format!("{}: could not reach the store, please try again", action),
      other => format!("{}: {}", action, other),
    };
    Self {
      level: NoticeLevel::Error,
      message,
      error_kind: Some(err.kind()),
    }
  }
}
