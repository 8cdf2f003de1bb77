// core/src/backend/mod.rs

//! The hosted backend, as seen by the storefront core.
//!
//! Each trait mirrors a group of queries the hosted service exposes. Row-level
//! security is the backend's business; callers pass the acting user explicitly
//! and implementations scope every owner-bound query by it.

pub mod memory;

use crate::error::StoreResult;
use crate::models::{
  Address, Banner, CartLine, NewAddress, NewOrder, NewOrderLine, Order, OrderUpdate, OrderWithLines, Product,
};
use crate::realtime::{ChangeSubscription, Table};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait CatalogBackend: Send + Sync {
  /// `select * from products where in_stock = true order by created_at desc`
  async fn in_stock_products(&self) -> StoreResult<Vec<Product>>;

  async fn product(&self, product_id: Uuid) -> StoreResult<Option<Product>>;

  /// Carousel banners ordered by `sort_order`.
  async fn banners(&self) -> StoreResult<Vec<Banner>>;

  async fn set_product_price(&self, product_id: Uuid, price_cents: i64) -> StoreResult<Product>;

  async fn set_product_stock(&self, product_id: Uuid, stock_qty: i32, in_stock: bool) -> StoreResult<Product>;
}

/// `cart_items`, unique on `(user_id, product_id)`.
#[async_trait]
pub trait CartBackend: Send + Sync {
  /// Cart rows joined with their products, oldest line first. Rows whose
  /// product is gone are not returned.
  async fn cart_lines(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>>;

  /// Inserts a row unless one exists for the key. Returns whether it inserted.
  /// `NotFound` if the product does not exist.
  async fn insert_cart_item_if_absent(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<bool>;

  /// Sets `qty` on an existing row. Returns whether a row was updated.
  async fn set_cart_item_qty(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<bool>;

  /// `qty = qty + by` in one statement. Returns whether a row was updated.
  async fn increment_cart_item_qty(&self, user_id: Uuid, product_id: Uuid, by: i32) -> StoreResult<bool>;

  async fn delete_cart_item(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()>;

  async fn delete_cart_items(&self, user_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait OrderBackend: Send + Sync {
  /// Server-side `generate_order_id()`: a 12-digit code not used by any order.
  async fn generate_order_id(&self) -> StoreResult<String>;

  /// Writes the header and every line in one transaction. Either the whole
  /// order becomes visible or none of it does.
  async fn insert_order(&self, order: NewOrder, lines: Vec<NewOrderLine>) -> StoreResult<OrderWithLines>;

  /// Orders of one user with their lines, newest first.
  async fn orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<OrderWithLines>>;

  /// Most recent orders across all users, newest first.
  async fn recent_orders(&self, limit: i64) -> StoreResult<Vec<OrderWithLines>>;

  async fn order(&self, id: Uuid) -> StoreResult<Option<OrderWithLines>>;

  /// Applies the mutable fields and bumps `updated_at`.
  async fn update_order(&self, id: Uuid, update: OrderUpdate) -> StoreResult<Order>;
}

#[async_trait]
pub trait ProfileBackend: Send + Sync {
  /// `select is_admin from profiles where user_id = :u`; a missing profile is not an admin.
  async fn is_admin(&self, user_id: Uuid) -> StoreResult<bool>;

  /// Whether a profile row exists for the user.
  async fn profile_exists(&self, user_id: Uuid) -> StoreResult<bool>;

  async fn address(&self, address_id: Uuid) -> StoreResult<Option<Address>>;

  async fn addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>>;

  async fn insert_address(&self, user_id: Uuid, address: NewAddress) -> StoreResult<Address>;
}

pub trait ChangeFeed: Send + Sync {
  /// Subscribes to changes on `table`, optionally only rows owned by `user_filter`.
  fn subscribe(&self, table: Table, user_filter: Option<Uuid>) -> ChangeSubscription;
}

/// Everything the core needs from the hosted service.
pub trait Backend: CatalogBackend + CartBackend + OrderBackend + ProfileBackend + ChangeFeed {}

impl<T> Backend for T where T: CatalogBackend + CartBackend + OrderBackend + ProfileBackend + ChangeFeed {}

pub type SharedBackend = Arc<dyn Backend>;
