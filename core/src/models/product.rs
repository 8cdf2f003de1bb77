// core/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry. Its price is a point-in-time reference: carts show the
/// current value, placed orders keep their own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id: Uuid,
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub price_cents: i64,
  pub currency: String,
  #[serde(default)]
  pub images: Vec<String>,
  pub in_stock: bool,
  pub stock_qty: i32,
  pub created_at: DateTime<Utc>,
}

/// Home-page carousel slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
  pub id: Uuid,
  pub title: String,
  pub image_url: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,
  pub sort_order: i32,
}
