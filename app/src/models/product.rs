// app/src/models/product.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use storefront::models::{Banner, Product};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
  pub id: Uuid,
  pub title: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub currency: String,
  pub images: Vec<String>,
  pub in_stock: bool,
  pub stock_qty: i32,
  pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      title: row.title,
      description: row.description,
      price_cents: row.price_cents,
      currency: row.currency,
      images: row.images,
      in_stock: row.in_stock,
      stock_qty: row.stock_qty,
      created_at: row.created_at,
    }
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct BannerRow {
  pub id: Uuid,
  pub title: String,
  pub image_url: String,
  pub link: Option<String>,
  pub sort_order: i32,
}

impl From<BannerRow> for Banner {
  fn from(row: BannerRow) -> Self {
    Banner {
      id: row.id,
      title: row.title,
      image_url: row.image_url,
      link: row.link,
      sort_order: row.sort_order,
    }
  }
}
