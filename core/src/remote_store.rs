// core/src/remote_store.rs

//! Per-user cart persisted by the backend.
//!
//! Lines are read joined with products, so they always carry the current
//! title and price. Writes go through two explicit primitives,
//! insert-if-absent and set/increment, instead of an ambiguous upsert.

use crate::backend::SharedBackend;
use crate::error::{StoreError, StoreResult};
use crate::models::CartLine;
use crate::realtime::{ChangeSubscription, Table};
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct RemoteCartStore {
  backend: SharedBackend,
}

impl RemoteCartStore {
  pub fn new(backend: SharedBackend) -> Self {
    Self { backend }
  }

  #[instrument(name = "remote_cart::load", skip(self), err(Display))]
  pub async fn load(&self, user_id: Uuid) -> StoreResult<Vec<CartLine>> {
    self.backend.cart_lines(user_id).await
  }

  pub async fn insert_if_absent(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<bool> {
    self.backend.insert_cart_item_if_absent(user_id, product_id, qty).await
  }

  /// Sets the quantity exactly; `qty <= 0` deletes the row.
  pub async fn set_quantity(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<()> {
    if qty <= 0 {
      return self.delete(user_id, product_id).await;
    }
    self.backend.set_cart_item_qty(user_id, product_id, qty).await?;
    Ok(())
  }

  pub async fn increment_quantity(&self, user_id: Uuid, product_id: Uuid, by: i32) -> StoreResult<bool> {
    self.backend.increment_cart_item_qty(user_id, product_id, by).await
  }

  /// Additive merge: creates the line with `qty`, or adds `qty` to the existing one.
  ///
  /// Another session may insert or delete the same row between the two
  /// primitives; a `Conflict` on insert turns into an increment and a vanished
  /// row turns into one more insert attempt.
  #[instrument(name = "remote_cart::merge", skip(self), err(Display))]
  pub async fn merge(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<()> {
    for attempt in 0..2 {
      let inserted = match self.insert_if_absent(user_id, product_id, qty).await {
        Ok(inserted) => inserted,
        Err(StoreError::Conflict(reason)) => {
          debug!(%reason, "Concurrent insert, retrying as increment.");
          false
        }
        Err(e) => return Err(e),
      };
      if inserted || self.increment_quantity(user_id, product_id, qty).await? {
        return Ok(());
      }
      debug!(attempt, "Cart row vanished between insert and increment.");
    }
    Err(StoreError::Conflict(format!(
      "Cart line for product {} kept changing underneath the merge",
      product_id
    )))
  }

  /// Set semantics: creates the line with `qty`, or overwrites the existing quantity.
  pub async fn upsert(&self, user_id: Uuid, product_id: Uuid, qty: i32) -> StoreResult<()> {
    if !self.insert_if_absent(user_id, product_id, qty).await? {
      self.set_quantity(user_id, product_id, qty).await?;
    }
    Ok(())
  }

  /// Idempotent.
  pub async fn delete(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()> {
    self.backend.delete_cart_item(user_id, product_id).await
  }

  pub async fn delete_all(&self, user_id: Uuid) -> StoreResult<()> {
    self.backend.delete_cart_items(user_id).await
  }

  pub fn subscribe(&self, user_id: Uuid) -> ChangeSubscription {
    self.backend.subscribe(Table::CartItems, Some(user_id))
  }
}
