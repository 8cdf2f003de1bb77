// app/src/models/order_item.rs

use sqlx::FromRow;
use storefront::models::OrderLine;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub title: String,
  pub unit_price_cents: i64,
  pub qty: i32,
  pub subtotal_cents: i64,
}

impl From<OrderItemRow> for OrderLine {
  fn from(row: OrderItemRow) -> Self {
    OrderLine {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      title: row.title,
      unit_price_cents: row.unit_price_cents,
      qty: row.qty,
      subtotal_cents: row.subtotal_cents,
    }
  }
}
