// core/src/models/address.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub id: Uuid,
  pub user_id: Uuid,
  pub full_name: String,
  pub line1: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub line2: Option<String>,
  pub city: String,
  pub state: String,
  pub postal_code: String,
  pub phone: String,
  pub created_at: DateTime<Utc>,
}

/// Shipping address as entered by the buyer, before the backend assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
  pub full_name: String,
  pub line1: String,
  #[serde(default)]
  pub line2: Option<String>,
  pub city: String,
  pub state: String,
  pub postal_code: String,
  pub phone: String,
}
