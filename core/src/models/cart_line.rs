// core/src/models/cart_line.rs

use super::product::Product;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product in a cart, denormalized with the title/price it is shown with.
///
/// This is also the on-disk shape of the device-local cart, so fields added
/// later need `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
  pub id: Uuid,
  pub product_id: Uuid,
  pub title: String,
  pub price_cents: i64,
  pub qty: i32,
  #[serde(default)]
  pub images: Vec<String>,
}

impl CartLine {
  pub fn from_product(product: &Product, qty: i32) -> Self {
    Self {
      id: Uuid::new_v4(),
      product_id: product.id,
      title: product.title.clone(),
      price_cents: product.price_cents,
      qty,
      images: product.images.clone(),
    }
  }

  pub fn subtotal_cents(&self) -> i64 {
    self.price_cents * i64::from(self.qty)
  }
}
