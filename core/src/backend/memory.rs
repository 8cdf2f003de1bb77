// core/src/backend/memory.rs

//! An in-process [`Backend`](super::Backend) with the same observable rules as
//! the hosted service: the `(user_id, product_id)` uniqueness on cart rows,
//! the product join on cart reads, atomic order writes and per-row change
//! events.
//!
//! It also supports one-shot failure injection ([`FaultPoint`]) and delayed
//! cart loads and inserts so the engine's failure and ordering paths can be exercised.

use super::{CartBackend, CatalogBackend, ChangeFeed, OrderBackend, ProfileBackend};
use crate::error::{StoreError, StoreResult};
use crate::models::{
  Address, Banner, CartLine, NewAddress, NewOrder, NewOrderLine, Order, OrderLine, OrderStatus, OrderUpdate,
  OrderWithLines, PaymentStatus, Product,
};
use crate::order_code;
use crate::realtime::{ChangeEvent, ChangeHub, ChangeKind, ChangeSubscription, Table};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use uuid::Uuid;

/// Operations that can be made to fail once via [`InMemoryBackend::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
  InStockProducts,
  Banners,
  CartLines,
  InsertCartItem,
  SetCartItem,
  IncrementCartItem,
  DeleteCartItem,
  DeleteCartItems,
  GenerateOrderId,
  InsertOrder,
  OrdersForUser,
}

#[derive(Debug, Clone)]
struct CartRow {
  id: Uuid,
  user_id: Uuid,
  product_id: Uuid,
  qty: i32,
}

#[derive(Debug, Default)]
struct MemoryState {
  products: Vec<Product>,
  banners: Vec<Banner>,
  cart_items: Vec<CartRow>,
  orders: Vec<Order>,
  order_lines: Vec<OrderLine>,
  /// user_id -> is_admin
  profiles: HashMap<Uuid, bool>,
  addresses: Vec<Address>,
}

impl MemoryState {
  fn cart_row_mut(&mut self, user_id: Uuid, product_id: Uuid) -> Option<&mut CartRow> {
    self
      .cart_items
      .iter_mut()
      .find(|row| row.user_id == user_id && row.product_id == product_id)
  }

  fn product_mut(&mut self, product_id: Uuid) -> StoreResult<&mut Product> {
    self
      .products
      .iter_mut()
      .find(|p| p.id == product_id)
      .ok_or_else(|| StoreError::NotFound(format!("Product {} not found", product_id)))
  }

  fn with_lines(&self, order: &Order) -> OrderWithLines {
    OrderWithLines {
      order: order.clone(),
      lines: self.order_lines.iter().filter(|l| l.order_id == order.id).cloned().collect(),
    }
  }
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
  state: Mutex<MemoryState>,
  hub: ChangeHub,
  faults: Mutex<Vec<FaultPoint>>,
  cart_load_delays: Mutex<VecDeque<Duration>>,
  cart_insert_delays: Mutex<VecDeque<Duration>>,
}

impl InMemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  // --- Seeding ---

  /// Adds an in-stock product and returns it.
  pub fn seed_product(&self, title: &str, price_cents: i64) -> Product {
    let product = Product {
      id: Uuid::new_v4(),
      title: title.to_string(),
      description: None,
      price_cents,
      currency: "INR".to_string(),
      images: vec![format!("/images/{}.jpg", title.to_lowercase().replace(' ', "-"))],
      in_stock: true,
      stock_qty: 100,
      created_at: Utc::now(),
    };
    self.insert_product(product.clone());
    product
  }

  pub fn insert_product(&self, product: Product) {
    self.state.lock().products.push(product);
  }

  pub fn remove_product(&self, product_id: Uuid) {
    let mut state = self.state.lock();
    state.products.retain(|p| p.id != product_id);
  }

  pub fn insert_banner(&self, banner: Banner) {
    self.state.lock().banners.push(banner);
  }

  pub fn create_profile(&self, user_id: Uuid, is_admin: bool) {
    self.state.lock().profiles.insert(user_id, is_admin);
  }

  /// Raw `(product_id, qty)` rows of a user's cart, bypassing the product join.
  pub fn cart_rows(&self, user_id: Uuid) -> Vec<(Uuid, i32)> {
    let state = self.state.lock();
    state
      .cart_items
      .iter()
      .filter(|row| row.user_id == user_id)
      .map(|row| (row.product_id, row.qty))
      .collect()
  }

  pub fn order_count(&self) -> usize {
    self.state.lock().orders.len()
  }

  // --- Fault injection ---

  /// Makes the next call of `point` fail with a transient error.
  pub fn fail_next(&self, point: FaultPoint) {
    self.faults.lock().push(point);
  }

  /// Delays the next `cart_lines` calls, one entry per call.
  pub fn delay_cart_loads(&self, delays: impl IntoIterator<Item = Duration>) {
    self.cart_load_delays.lock().extend(delays);
  }

  /// Delays the next `insert_cart_item_if_absent` calls, one entry per call.
  pub fn delay_cart_inserts(&self, delays: impl IntoIterator<Item = Duration>) {
    self.cart_insert_delays.lock().extend(delays);
  }

  fn check_fault(&self, point: FaultPoint) -> StoreResult<()> {
    let mut faults = self.faults.lock();
    if let Some(idx) = faults.iter().position(|f| *f == point) {
      faults.remove(idx);
      tracing::debug!(?point, "Injected backend failure.");
      return Err(StoreError::transient(anyhow::anyhow!("injected failure at {:?}", point)));
    }
    Ok(())
  }

  fn emit(&self, table: Table, kind: ChangeKind, user_id: Option<Uuid>) {
    self.hub.publish(ChangeEvent { table, kind, user_id });
  }
}

#[async_trait]
impl CatalogBackend for InMemoryBackend {
  async fn in_stock_products(&self) -> StoreResult<Vec<Product>> {
    self.check_fault(FaultPoint::InStockProducts)?;
    let state = self.state.lock();
    let mut products: Vec<Product> = state.products.iter().filter(|p| p.in_stock).cloned().collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(products)
  }

  async fn product(&self, product_id: Uuid) -> StoreResult<Option<Product>> {
    Ok(self.state.lock().products.iter().find(|p| p.id == product_id).cloned())
  }

  async fn banners(&self) -> StoreResult<Vec<Banner>> {
    self.check_fault(FaultPoint::Banners)?;
    let mut banners = self.state.lock().banners.clone();
    banners.sort_by_key(|b| b.sort_order);
    Ok(banners)
  }

  async fn set_product_price(&self, product_id: Uuid, price_cents: i64) -> StoreResult<Product> {
    let product = {
      let mut state = self.state.lock();
      let product = state.product_mut(product_id)?;
      product.price_cents = price_cents;
      product.clone()
    };
    self.emit(Table::Products, ChangeKind::Update, None);
    Ok(product)
  }

  async fn set_product_stock(&self, product_id: Uuid, stock_qty: i32, in_stock: bool) -> StoreResult<Product> {
    let product = {
      let mut state = self.state.lock();
      let product = state.product_mut(product_id)?;
      product.stock_qty = stock_qty;
      product.in_stock = in_stock;
      product.clone()
    };
    self.emit(Table::Products, ChangeKind::Update, None);
    Ok(product)
  }
}

#[async_trait]
impl CartBackend for InMemoryBackend {
  async fn cart_lines(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>> {
    self.check_fault(FaultPoint::CartLines)?;

    let lines: Vec<CartLine> = {
      let state = self.state.lock();
      state
        .cart_items
        .iter()
        .filter(|row| row.user_id == user_id)
        .filter_map(|row| {
          let product = state.products.iter().find(|p| p.id == row.product_id)?;
          Some(CartLine {
            id: row.id,
            product_id: row.product_id,
            title: product.title.clone(),
            price_cents: product.price_cents,
            qty: row.qty,
            images: product.images.clone(),
          })
        })
        .collect()
    };
    // The snapshot is taken now; a delayed response delivers it late.
    let delay = self.cart_load_delays.lock().pop_front();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    Ok(lines)
  }

  async fn insert_cart_item_if_absent(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<bool> {
    self.check_fault(FaultPoint::InsertCartItem)?;
    let delay = self.cart_insert_delays.lock().pop_front();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    {
      let mut state = self.state.lock();
      if !state.products.iter().any(|p| p.id == product_id) {
        return Err(StoreError::NotFound(format!("Product {} not found", product_id)));
      }
      if state.cart_row_mut(user_id, product_id).is_some() {
        return Ok(false);
      }
      state.cart_items.push(CartRow {
        id: Uuid::new_v4(),
        user_id,
        product_id,
        qty,
      });
    }
    self.emit(Table::CartItems, ChangeKind::Insert, Some(user_id));
    Ok(true)
  }

  async fn set_cart_item_qty(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<bool> {
    self.check_fault(FaultPoint::SetCartItem)?;
    let updated = match self.state.lock().cart_row_mut(user_id, product_id) {
      Some(row) => {
        row.qty = qty;
        true
      }
      None => false,
    };
    if updated {
      self.emit(Table::CartItems, ChangeKind::Update, Some(user_id));
    }
    Ok(updated)
  }

  async fn increment_cart_item_qty(&self, user_id: Uuid, product_id: Uuid, by: i32) -> StoreResult<bool> {
    self.check_fault(FaultPoint::IncrementCartItem)?;
    let updated = match self.state.lock().cart_row_mut(user_id, product_id) {
      Some(row) => {
        row.qty = row
          .qty
          .checked_add(by)
          .ok_or_else(|| StoreError::Validation(format!("Quantity of product {} out of range", product_id)))?;
        true
      }
      None => false,
    };
    if updated {
      self.emit(Table::CartItems, ChangeKind::Update, Some(user_id));
    }
    Ok(updated)
  }

  async fn delete_cart_item(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()> {
    self.check_fault(FaultPoint::DeleteCartItem)?;
    let removed = {
      let mut state = self.state.lock();
      let before = state.cart_items.len();
      state
        .cart_items
        .retain(|row| !(row.user_id == user_id && row.product_id == product_id));
      before != state.cart_items.len()
    };
    if removed {
      self.emit(Table::CartItems, ChangeKind::Delete, Some(user_id));
    }
    Ok(())
  }

  async fn delete_cart_items(&self, user_id: Uuid) -> StoreResult<()> {
    self.check_fault(FaultPoint::DeleteCartItems)?;
    let removed = {
      let mut state = self.state.lock();
      let before = state.cart_items.len();
      state.cart_items.retain(|row| row.user_id != user_id);
      before != state.cart_items.len()
    };
    if removed {
      self.emit(Table::CartItems, ChangeKind::Delete, Some(user_id));
    }
    Ok(())
  }
}

#[async_trait]
impl OrderBackend for InMemoryBackend {
  async fn generate_order_id(&self) -> StoreResult<String> {
    self.check_fault(FaultPoint::GenerateOrderId)?;
    let state = self.state.lock();
    let code = order_code::generate_unique(Utc::now(), &mut rand::thread_rng(), |candidate| {
      state.orders.iter().any(|o| o.order_id == candidate)
    });
    Ok(code)
  }

  async fn insert_order(&self, order: NewOrder, lines: Vec<NewOrderLine>) -> StoreResult<OrderWithLines> {
    self.check_fault(FaultPoint::InsertOrder)?;
    let placed = {
      let mut state = self.state.lock();
      if state.orders.iter().any(|o| o.order_id == order.order_id) {
        return Err(StoreError::Conflict(format!("Order id {} already exists", order.order_id)));
      }
      let now = Utc::now();
      let header = Order {
        id: Uuid::new_v4(),
        order_id: order.order_id,
        user_id: order.user_id,
        address_id: order.address_id,
        amount_total_cents: order.amount_total_cents,
        currency: order.currency,
        status: OrderStatus::Placed,
        payment_status: PaymentStatus::Pending,
        payment_upi: order.payment_upi,
        payment_qr_expires_at: order.payment_qr_expires_at,
        payment_utr: None,
        created_at: now,
        updated_at: now,
      };
      let order_lines: Vec<OrderLine> = lines
        .into_iter()
        .map(|line| OrderLine {
          id: Uuid::new_v4(),
          order_id: header.id,
          product_id: line.product_id,
          title: line.title,
          unit_price_cents: line.unit_price_cents,
          qty: line.qty,
          subtotal_cents: line.subtotal_cents,
        })
        .collect();
      state.orders.push(header.clone());
      state.order_lines.extend(order_lines.iter().cloned());
      OrderWithLines {
        order: header,
        lines: order_lines,
      }
    };
    self.emit(Table::Orders, ChangeKind::Insert, Some(placed.order.user_id));
    Ok(placed)
  }

  async fn orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<OrderWithLines>> {
    self.check_fault(FaultPoint::OrdersForUser)?;
    let state = self.state.lock();
    // Insertion order is placement order.
    Ok(
      state
        .orders
        .iter()
        .rev()
        .filter(|o| o.user_id == user_id)
        .map(|o| state.with_lines(o))
        .collect(),
    )
  }

  async fn recent_orders(&self, limit: i64) -> StoreResult<Vec<OrderWithLines>> {
    let state = self.state.lock();
    let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
    Ok(state.orders.iter().rev().take(limit).map(|o| state.with_lines(o)).collect())
  }

  async fn order(&self, id: Uuid) -> StoreResult<Option<OrderWithLines>> {
    let state = self.state.lock();
    Ok(state.orders.iter().find(|o| o.id == id).map(|o| state.with_lines(o)))
  }

  async fn update_order(&self, id: Uuid, update: OrderUpdate) -> StoreResult<Order> {
    let order = {
      let mut state = self.state.lock();
      let order = state
        .orders
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| StoreError::NotFound(format!("Order {} not found", id)))?;
      if let Some(status) = update.status {
        order.status = status;
      }
      if let Some(payment_status) = update.payment_status {
        order.payment_status = payment_status;
      }
      if let Some(utr) = update.payment_utr {
        order.payment_utr = Some(utr);
      }
      order.updated_at = Utc::now();
      order.clone()
    };
    self.emit(Table::Orders, ChangeKind::Update, Some(order.user_id));
    Ok(order)
  }
}

#[async_trait]
impl ProfileBackend for InMemoryBackend {
  async fn is_admin(&self, user_id: Uuid) -> StoreResult<bool> {
    Ok(self.state.lock().profiles.get(&user_id).copied().unwrap_or(false))
  }

  async fn profile_exists(&self, user_id: Uuid) -> StoreResult<bool> {
    Ok(self.state.lock().profiles.contains_key(&user_id))
  }

  async fn address(&self, address_id: Uuid) -> StoreResult<Option<Address>> {
    Ok(self.state.lock().addresses.iter().find(|a| a.id == address_id).cloned())
  }

  async fn addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>> {
    let state = self.state.lock();
    Ok(state.addresses.iter().filter(|a| a.user_id == user_id).cloned().collect())
  }

  async fn insert_address(&self, user_id: Uuid, address: NewAddress) -> StoreResult<Address> {
    let address = Address {
      id: Uuid::new_v4(),
      user_id,
      full_name: address.full_name,
      line1: address.line1,
      line2: address.line2,
      city: address.city,
      state: address.state,
      postal_code: address.postal_code,
      phone: address.phone,
      created_at: Utc::now(),
    };
    self.state.lock().addresses.push(address.clone());
    Ok(address)
  }
}

impl ChangeFeed for InMemoryBackend {
  fn subscribe(&self, table: Table, user_filter: Option<Uuid>) -> ChangeSubscription {
    self.hub.subscribe(table, user_filter)
  }
}
