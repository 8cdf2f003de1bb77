// core/src/models/order_line.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Frozen commercial terms of one cart line at placement time.
/// Never re-derived from the product row afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
  pub id: Uuid,
  /// References `Order::id`, not the human-facing code.
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub title: String,
  pub unit_price_cents: i64,
  pub qty: i32,
  pub subtotal_cents: i64,
}

/// Line snapshot before the order row exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
  pub product_id: Uuid,
  pub title: String,
  pub unit_price_cents: i64,
  pub qty: i32,
  pub subtotal_cents: i64,
}
