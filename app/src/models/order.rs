// app/src/models/order.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use storefront::models::Order;
use storefront::StoreError;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: Uuid,
  pub order_id: String,
  pub user_id: Uuid,
  pub address_id: Uuid,
  pub amount_total_cents: i64,
  pub currency: String,
  pub status: String,
  pub payment_status: String,
  pub payment_upi: String,
  pub payment_qr_expires_at: DateTime<Utc>,
  pub payment_utr: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    // The CHECK constraints make a parse failure a schema drift, not bad input.
    let status = row
      .status
      .parse()
      .map_err(|e: StoreError| StoreError::Internal(format!("order {}: {}", row.order_id, e)))?;
    let payment_status = row
      .payment_status
      .parse()
      .map_err(|e: StoreError| StoreError::Internal(format!("order {}: {}", row.order_id, e)))?;
    Ok(Order {
      id: row.id,
      order_id: row.order_id,
      user_id: row.user_id,
      address_id: row.address_id,
      amount_total_cents: row.amount_total_cents,
      currency: row.currency,
      status,
      payment_status,
      payment_upi: row.payment_upi,
      payment_qr_expires_at: row.payment_qr_expires_at,
      payment_utr: row.payment_utr,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}
