// app/src/models/address.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use storefront::models::Address;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct AddressRow {
  pub id: Uuid,
  pub user_id: Uuid,
  pub full_name: String,
  pub line1: String,
  pub line2: Option<String>,
  pub city: String,
  pub state: String,
  pub postal_code: String,
  pub phone: String,
  pub created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
  fn from(row: AddressRow) -> Self {
    Address {
      id: row.id,
      user_id: row.user_id,
      full_name: row.full_name,
      line1: row.line1,
      line2: row.line2,
      city: row.city,
      state: row.state,
      postal_code: row.postal_code,
      phone: row.phone,
      created_at: row.created_at,
    }
  }
}
