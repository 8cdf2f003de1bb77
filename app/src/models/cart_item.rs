// app/src/models/cart_item.rs

use sqlx::FromRow;
use storefront::models::CartLine;
use uuid::Uuid;

/// `cart_items` joined with `products`: the line carries the live title and price.
#[derive(Debug, Clone, FromRow)]
pub struct CartItemWithProduct {
  pub cart_item_id: Uuid,
  pub product_id: Uuid,
  pub title: String,
  pub price_cents: i64,
  pub qty: i32,
  pub images: Vec<String>,
}

impl From<CartItemWithProduct> for CartLine {
  fn from(row: CartItemWithProduct) -> Self {
    CartLine {
      id: row.cart_item_id,
      product_id: row.product_id,
      title: row.title,
      price_cents: row.price_cents,
      qty: row.qty,
      images: row.images,
    }
  }
}
