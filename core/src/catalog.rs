// core/src/catalog.rs

//! Read side of the catalog. Listing never fails from the caller's point of
//! view: an erroring or empty backend yields the built-in default set.

use crate::backend::SharedBackend;
use crate::error::{StoreError, StoreResult};
use crate::models::{Banner, Product};
use chrono::{TimeZone, Utc};
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogReader {
  backend: SharedBackend,
}

impl CatalogReader {
  pub fn new(backend: SharedBackend) -> Self {
    Self { backend }
  }

  #[instrument(name = "catalog::list_products", skip(self))]
  pub async fn list_products(&self) -> Vec<Product> {
    match self.backend.in_stock_products().await {
      Ok(products) if !products.is_empty() => products,
      Ok(_) => {
        warn!("Catalog is empty, serving default products.");
        default_products()
      }
      Err(e) => {
        warn!(error = %e, "Failed to load products, serving default products.");
        default_products()
      }
    }
  }

  #[instrument(name = "catalog::list_banners", skip(self))]
  pub async fn list_banners(&self) -> Vec<Banner> {
    match self.backend.banners().await {
      Ok(banners) if !banners.is_empty() => banners,
      Ok(_) => default_banners(),
      Err(e) => {
        warn!(error = %e, "Failed to load banners, serving default banners.");
        default_banners()
      }
    }
  }

  /// Current product row. Unlike listing, a missing product is an error here.
  pub async fn product(&self, product_id: Uuid) -> StoreResult<Product> {
    self
      .backend
      .product(product_id)
      .await?
      .ok_or_else(|| StoreError::NotFound(format!("Product {} not found", product_id)))
  }
}

// Fixed ids so repeated fallback listings agree with each other.
const DEFAULT_PRODUCT_IDS: [u128; 3] = [
  0x6f1c_2f0a_9a55_4d0e_8a41_0c3b_51d2_0001,
  0x6f1c_2f0a_9a55_4d0e_8a41_0c3b_51d2_0002,
  0x6f1c_2f0a_9a55_4d0e_8a41_0c3b_51d2_0003,
];

pub fn default_products() -> Vec<Product> {
  let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
  let entries: [(&str, &str, i64, &str); 3] = [
    ("Classic Cotton Tee", "Everyday crew-neck tee in soft combed cotton.", 49_900, "classic-tee"),
    ("Canvas Tote Bag", "Sturdy tote with inner pocket.", 29_900, "canvas-tote"),
    ("Ceramic Coffee Mug", "350 ml stoneware mug, dishwasher safe.", 19_900, "coffee-mug"),
  ];
  entries
    .iter()
    .zip(DEFAULT_PRODUCT_IDS)
    .map(|((title, description, price_cents, slug), id)| Product {
      id: Uuid::from_u128(id),
      title: (*title).to_string(),
      description: Some((*description).to_string()),
      price_cents: *price_cents,
      currency: "INR".to_string(),
      images: vec![format!("/images/defaults/{}.jpg", slug)],
      in_stock: true,
      stock_qty: 0,
      created_at,
    })
    .collect()
}

pub fn default_banners() -> Vec<Banner> {
  vec![
    Banner {
      id: Uuid::from_u128(0x6f1c_2f0a_9a55_4d0e_8a41_0c3b_51d2_0101),
      title: "New arrivals".to_string(),
      image_url: "/images/defaults/banner-new.jpg".to_string(),
      link: Some("/products".to_string()),
      sort_order: 0,
    },
    Banner {
      id: Uuid::from_u128(0x6f1c_2f0a_9a55_4d0e_8a41_0c3b_51d2_0102),
      title: "Free shipping above ₹999".to_string(),
      image_url: "/images/defaults/banner-shipping.jpg".to_string(),
      link: None,
      sort_order: 1,
    },
  ]
}
