// app/src/db/mod.rs

//! Postgres implementation of the storefront backend traits.
//!
//! Queries are checked at runtime (`sqlx::query_as::<_, Row>`), so the crate
//! builds without a live database. Row-change events come from the LISTEN
//! task in [`listener`] and are fanned out through a shared [`ChangeHub`].

pub mod listener;

use crate::models::{AddressRow, BannerRow, CartItemWithProduct, OrderItemRow, OrderRow, ProductRow};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use storefront::backend::{CartBackend, CatalogBackend, ChangeFeed, OrderBackend, ProfileBackend};
use storefront::models::{
  Address, Banner, CartLine, NewAddress, NewOrder, NewOrderLine, Order, OrderLine, OrderUpdate, OrderWithLines,
  Product,
};
use storefront::{ChangeHub, ChangeSubscription, ErrorKind, StoreError, StoreResult, Table};
use tracing::{debug, instrument};
use uuid::Uuid;

macro_rules! product_columns {
  () => {
    "id, title, description, price_cents, currency, images, in_stock, stock_qty, created_at"
  };
}

macro_rules! order_columns {
  () => {
    "id, order_id, user_id, address_id, amount_total_cents, currency, status, payment_status, payment_upi, \
     payment_qr_expires_at, payment_utr, created_at, updated_at"
  };
}

macro_rules! order_item_columns {
  () => {
    "id, order_id, product_id, title, unit_price_cents, qty, subtotal_cents"
  };
}

macro_rules! address_columns {
  () => {
    "id, user_id, full_name, line1, line2, city, state, postal_code, phone, created_at"
  };
}

/// Maps driver failures onto the store taxonomy.
pub fn store_error(e: sqlx::Error) -> StoreError {
  if let sqlx::Error::RowNotFound = e {
    return StoreError::NotFound("row not found".to_string());
  }
  let code = e.as_database_error().and_then(|d| d.code()).map(|c| c.into_owned());
  match code.as_deref().and_then(sqlstate_kind) {
    Some(ErrorKind::Conflict) => StoreError::Conflict(e.to_string()),
    Some(ErrorKind::NotFound) => StoreError::NotFound(e.to_string()),
    Some(_) => StoreError::Validation(e.to_string()),
    None => StoreError::transient(e),
  }
}

/// SQLSTATEs caused by the request itself rather than the connection.
fn sqlstate_kind(code: &str) -> Option<ErrorKind> {
  match code {
    "23505" => Some(ErrorKind::Conflict),
    "23503" => Some(ErrorKind::NotFound),
    // check_violation, invalid_text_representation, numeric_value_out_of_range
    "23514" | "22P02" | "22003" => Some(ErrorKind::Validation),
    _ => None,
  }
}

#[derive(Clone)]
pub struct PgBackend {
  pool: PgPool,
  hub: ChangeHub,
}

impl PgBackend {
  pub fn new(pool: PgPool, hub: ChangeHub) -> Self {
    Self { pool, hub }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  async fn attach_lines(&self, orders: Vec<OrderRow>) -> StoreResult<Vec<OrderWithLines>> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = sqlx::query_as::<_, OrderItemRow>(concat!(
      "SELECT ",
      order_item_columns!(),
      " FROM order_items WHERE order_id = ANY($1) ORDER BY title"
    ))
    .bind(&ids)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;

    let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::with_capacity(orders.len());
    for item in items {
      by_order.entry(item.order_id).or_default().push(item.into());
    }
    orders
      .into_iter()
      .map(|row| {
        let lines = by_order.remove(&row.id).unwrap_or_default();
        Ok(OrderWithLines {
          order: Order::try_from(row)?,
          lines,
        })
      })
      .collect()
  }
}

#[async_trait]
impl CatalogBackend for PgBackend {
  #[instrument(name = "pg::in_stock_products", skip(self), err(Display))]
  async fn in_stock_products(&self) -> StoreResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(concat!(
      "SELECT ",
      product_columns!(),
      " FROM products WHERE in_stock = TRUE ORDER BY created_at DESC"
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn product(&self, product_id: Uuid) -> StoreResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(concat!("SELECT ", product_columns!(), " FROM products WHERE id = $1"))
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(row.map(Product::from))
  }

  async fn banners(&self) -> StoreResult<Vec<Banner>> {
    let rows = sqlx::query_as::<_, BannerRow>(
      "SELECT id, title, image_url, link, sort_order FROM banners ORDER BY sort_order",
    )
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(rows.into_iter().map(Banner::from).collect())
  }

  #[instrument(name = "pg::set_product_price", skip(self), err(Display))]
  async fn set_product_price(&self, product_id: Uuid, price_cents: i64) -> StoreResult<Product> {
    sqlx::query_as::<_, ProductRow>(concat!(
      "UPDATE products SET price_cents = $2 WHERE id = $1 RETURNING ",
      product_columns!()
    ))
    .bind(product_id)
    .bind(price_cents)
    .fetch_optional(&self.pool)
    .await
    .map_err(store_error)?
    .map(Product::from)
    .ok_or_else(|| StoreError::NotFound(format!("Product {} not found", product_id)))
  }

  #[instrument(name = "pg::set_product_stock", skip(self), err(Display))]
  async fn set_product_stock(&self, product_id: Uuid, stock_qty: i32, in_stock: bool) -> StoreResult<Product> {
    sqlx::query_as::<_, ProductRow>(concat!(
      "UPDATE products SET stock_qty = $2, in_stock = $3 WHERE id = $1 RETURNING ",
      product_columns!()
    ))
    .bind(product_id)
    .bind(stock_qty)
    .bind(in_stock)
    .fetch_optional(&self.pool)
    .await
    .map_err(store_error)?
    .map(Product::from)
    .ok_or_else(|| StoreError::NotFound(format!("Product {} not found", product_id)))
  }
}

#[async_trait]
impl CartBackend for PgBackend {
  #[instrument(name = "pg::cart_lines", skip(self), err(Display))]
  async fn cart_lines(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>> {
    let rows = sqlx::query_as::<_, CartItemWithProduct>(
      r#"
        SELECT
          ci.id AS cart_item_id,
          p.id AS product_id,
          p.title,
          p.price_cents,
          ci.qty,
          p.images
        FROM cart_items ci
        JOIN products p ON ci.product_id = p.id
        WHERE ci.user_id = $1
        ORDER BY ci.added_at ASC
      "#,
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(rows.into_iter().map(CartLine::from).collect())
  }

  async fn insert_cart_item_if_absent(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<bool> {
    let result = sqlx::query(
      "INSERT INTO cart_items (user_id, product_id, qty) VALUES ($1, $2, $3) \
       ON CONFLICT (user_id, product_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(qty)
    .execute(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(result.rows_affected() == 1)
  }

  async fn set_cart_item_qty(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<bool> {
    let result = sqlx::query("UPDATE cart_items SET qty = $3 WHERE user_id = $1 AND product_id = $2")
      .bind(user_id)
      .bind(product_id)
      .bind(qty)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(result.rows_affected() > 0)
  }

  async fn increment_cart_item_qty(&self, user_id: Uuid, product_id: Uuid, by: i32) -> StoreResult<bool> {
    let result = sqlx::query("UPDATE cart_items SET qty = qty + $3 WHERE user_id = $1 AND product_id = $2")
      .bind(user_id)
      .bind(product_id)
      .bind(by)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(result.rows_affected() > 0)
  }

  async fn delete_cart_item(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
      .bind(user_id)
      .bind(product_id)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(())
  }

  async fn delete_cart_items(&self, user_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    debug!(%user_id, removed = result.rows_affected(), "Cart rows deleted.");
    Ok(())
  }
}

#[async_trait]
impl OrderBackend for PgBackend {
  async fn generate_order_id(&self) -> StoreResult<String> {
    sqlx::query_scalar::<_, String>("SELECT generate_order_id()")
      .fetch_one(&self.pool)
      .await
      .map_err(store_error)
  }

  #[instrument(name = "pg::insert_order", skip(self, order, lines), fields(order_id = %order.order_id), err(Display))]
  async fn insert_order(&self, order: NewOrder, lines: Vec<NewOrderLine>) -> StoreResult<OrderWithLines> {
    let mut transaction = self.pool.begin().await.map_err(store_error)?;

    let header = sqlx::query_as::<_, OrderRow>(concat!(
      "INSERT INTO orders (order_id, user_id, address_id, amount_total_cents, currency, payment_upi, \
       payment_qr_expires_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
      order_columns!()
    ))
    .bind(&order.order_id)
    .bind(order.user_id)
    .bind(order.address_id)
    .bind(order.amount_total_cents)
    .bind(&order.currency)
    .bind(&order.payment_upi)
    .bind(order.payment_qr_expires_at)
    .fetch_one(&mut *transaction)
    .await
    .map_err(store_error)?;

    let mut order_lines = Vec::with_capacity(lines.len());
    for line in lines {
      let item = sqlx::query_as::<_, OrderItemRow>(concat!(
        "INSERT INTO order_items (order_id, product_id, title, unit_price_cents, qty, subtotal_cents) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
        order_item_columns!()
      ))
      .bind(header.id)
      .bind(line.product_id)
      .bind(&line.title)
      .bind(line.unit_price_cents)
      .bind(line.qty)
      .bind(line.subtotal_cents)
      .fetch_one(&mut *transaction)
      .await
      .map_err(store_error)?;
      order_lines.push(OrderLine::from(item));
    }

    transaction.commit().await.map_err(store_error)?;

    Ok(OrderWithLines {
      order: Order::try_from(header)?,
      lines: order_lines,
    })
  }

  async fn orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<OrderWithLines>> {
    let rows = sqlx::query_as::<_, OrderRow>(concat!(
      "SELECT ",
      order_columns!(),
      " FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    self.attach_lines(rows).await
  }

  async fn recent_orders(&self, limit: i64) -> StoreResult<Vec<OrderWithLines>> {
    let rows = sqlx::query_as::<_, OrderRow>(concat!(
      "SELECT ",
      order_columns!(),
      " FROM orders ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    self.attach_lines(rows).await
  }

  async fn order(&self, id: Uuid) -> StoreResult<Option<OrderWithLines>> {
    let row = sqlx::query_as::<_, OrderRow>(concat!("SELECT ", order_columns!(), " FROM orders WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    match row {
      Some(row) => Ok(self.attach_lines(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  #[instrument(name = "pg::update_order", skip(self), err(Display))]
  async fn update_order(&self, id: Uuid, update: OrderUpdate) -> StoreResult<Order> {
    let row = sqlx::query_as::<_, OrderRow>(concat!(
      "UPDATE orders SET \
         status = COALESCE($2, status), \
         payment_status = COALESCE($3, payment_status), \
         payment_utr = COALESCE($4, payment_utr), \
         updated_at = NOW() \
       WHERE id = $1 RETURNING ",
      order_columns!()
    ))
    .bind(id)
    .bind(update.status.map(|s| s.as_str()))
    .bind(update.payment_status.map(|s| s.as_str()))
    .bind(update.payment_utr)
    .fetch_optional(&self.pool)
    .await
    .map_err(store_error)?
    .ok_or_else(|| StoreError::NotFound(format!("Order {} not found", id)))?;
    Order::try_from(row)
  }
}

#[async_trait]
impl ProfileBackend for PgBackend {
  async fn is_admin(&self, user_id: Uuid) -> StoreResult<bool> {
    let is_admin = sqlx::query_scalar::<_, bool>("SELECT is_admin FROM profiles WHERE id = $1")
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(is_admin.unwrap_or(false))
  }

  async fn profile_exists(&self, user_id: Uuid) -> StoreResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1)")
      .bind(user_id)
      .fetch_one(&self.pool)
      .await
      .map_err(store_error)
  }

  async fn address(&self, address_id: Uuid) -> StoreResult<Option<Address>> {
    let row = sqlx::query_as::<_, AddressRow>(concat!("SELECT ", address_columns!(), " FROM addresses WHERE id = $1"))
      .bind(address_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(row.map(Address::from))
  }

  async fn addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>> {
    let rows = sqlx::query_as::<_, AddressRow>(concat!(
      "SELECT ",
      address_columns!(),
      " FROM addresses WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(rows.into_iter().map(Address::from).collect())
  }

  async fn insert_address(&self, user_id: Uuid, address: NewAddress) -> StoreResult<Address> {
    let row = sqlx::query_as::<_, AddressRow>(concat!(
      "INSERT INTO addresses (user_id, full_name, line1, line2, city, state, postal_code, phone) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
      address_columns!()
    ))
    .bind(user_id)
    .bind(address.full_name)
    .bind(address.line1)
    .bind(address.line2)
    .bind(address.city)
    .bind(address.state)
    .bind(address.postal_code)
    .bind(address.phone)
    .fetch_one(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(row.into())
  }
}

impl ChangeFeed for PgBackend {
  fn subscribe(&self, table: Table, user_filter: Option<Uuid>) -> ChangeSubscription {
    self.hub.subscribe(table, user_filter)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn request_caused_sqlstates_are_not_transient() {
    assert_eq!(sqlstate_kind("23505"), Some(ErrorKind::Conflict));
    assert_eq!(sqlstate_kind("23503"), Some(ErrorKind::NotFound));
    // qty = qty + $3 past INTEGER range
    assert_eq!(sqlstate_kind("22003"), Some(ErrorKind::Validation));
    assert_eq!(sqlstate_kind("23514"), Some(ErrorKind::Validation));
    assert_eq!(sqlstate_kind("08006"), None);
  }

  #[test]
  fn missing_row_is_not_found() {
    assert_eq!(store_error(sqlx::Error::RowNotFound).kind(), ErrorKind::NotFound);
    assert_eq!(store_error(sqlx::Error::PoolTimedOut).kind(), ErrorKind::TransientIo);
  }
}
