// core/src/models/owner.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Whose cart is being operated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Owner {
  /// The device itself; the cart only exists in local storage.
  Anonymous { device_id: Uuid },
  /// A signed-in user; the cart is persisted by the backend.
  User { user_id: Uuid },
}

impl Owner {
  pub fn user_id(&self) -> Option<Uuid> {
    match self {
      Owner::User { user_id } => Some(*user_id),
      Owner::Anonymous { .. } => None,
    }
  }

  pub fn is_authenticated(&self) -> bool {
    matches!(self, Owner::User { .. })
  }
}

impl fmt::Display for Owner {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Owner::Anonymous { device_id } => write!(f, "device:{}", device_id),
      Owner::User { user_id } => write!(f, "user:{}", user_id),
    }
  }
}
