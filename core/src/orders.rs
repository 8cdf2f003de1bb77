// core/src/orders.rs

//! Buyer-side order read model.
//!
//! Orders are loaded with their lines, newest first, and kept current by a
//! realtime subscription on the buyer's `orders` rows. Status and payment
//! changes come from the admin side; the only buyer write is the UPI
//! reference number after paying.

use crate::backend::SharedBackend;
use crate::error::{StoreError, StoreResult};
use crate::models::{Order, OrderUpdate, OrderWithLines, PaymentStatus};
use crate::realtime::Table;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// UPI transaction reference numbers are 12 digits.
pub const UTR_LEN: usize = 12;

#[derive(Clone)]
pub struct OrderHistory {
  backend: SharedBackend,
}

impl OrderHistory {
  pub fn new(backend: SharedBackend) -> Self {
    Self { backend }
  }

  #[instrument(name = "orders::load", skip(self), err(Display))]
  pub async fn load(&self, user_id: Uuid) -> StoreResult<Vec<OrderWithLines>> {
    self.backend.orders_for_user(user_id).await
  }

  /// Like [`OrderHistory::load`], but a failed read is an empty history.
  pub async fn load_or_empty(&self, user_id: Uuid) -> Vec<OrderWithLines> {
    match self.load(user_id).await {
      Ok(orders) => orders,
      Err(e) => {
        warn!(error = %e, %user_id, "Order history unavailable, showing none.");
        Vec::new()
      }
    }
  }

  /// Loads once, then reloads on every change to the user's orders until the
  /// returned feed is dropped.
  pub async fn watch(&self, user_id: Uuid) -> OrderFeed {
    let mut subscription = self.backend.subscribe(Table::Orders, Some(user_id));
    let (tx, rx) = watch::channel(self.load_or_empty(user_id).await);
    let history = self.clone();
    let task = tokio::spawn(async move {
      while let Some(event) = subscription.next().await {
        debug!(%user_id, kind = ?event.kind, "Order change pushed; reloading.");
        let orders = history.load_or_empty(user_id).await;
        if tx.send(orders).is_err() {
          break;
        }
      }
    });
    OrderFeed {
      orders: rx,
      _task: Arc::new(FeedTask(task)),
    }
  }

  /// Records the buyer's UPI transaction reference on their own order and
  /// marks the payment as submitted for review.
  #[instrument(name = "orders::submit_payment_reference", skip(self), err(Display))]
  pub async fn submit_payment_reference(&self, user_id: Uuid, order_id: Uuid, utr: &str) -> StoreResult<Order> {
    let utr = utr.trim();
    if utr.len() != UTR_LEN || !utr.bytes().all(|b| b.is_ascii_digit()) {
      return Err(StoreError::Validation(format!("UTR must be {} digits", UTR_LEN)));
    }

    let existing = self
      .backend
      .order(order_id)
      .await?
      .filter(|o| o.order.user_id == user_id)
      .ok_or_else(|| StoreError::NotFound(format!("Order {} not found", order_id)))?;
    if existing.order.payment_status == PaymentStatus::Paid {
      return Err(StoreError::Conflict(format!(
        "Order {} is already paid",
        existing.order.order_id
      )));
    }

    let updated = self
      .backend
      .update_order(
        order_id,
        OrderUpdate {
          payment_status: Some(PaymentStatus::Submitted),
          payment_utr: Some(utr.to_string()),
          ..OrderUpdate::default()
        },
      )
      .await?;
    info!(order_id = %updated.order_id, "Payment reference submitted.");
    Ok(updated)
  }
}

struct FeedTask(JoinHandle<()>);

impl Drop for FeedTask {
  fn drop(&mut self) {
    self.0.abort();
  }
}

/// Live order history. The background reload stops when the last clone is dropped.
#[derive(Clone)]
pub struct OrderFeed {
  orders: watch::Receiver<Vec<OrderWithLines>>,
  _task: Arc<FeedTask>,
}

impl OrderFeed {
  pub fn current(&self) -> Vec<OrderWithLines> {
    self.orders.borrow().clone()
  }

  /// Waits until the history is reloaded. `false` once the feed has ended.
  pub async fn changed(&mut self) -> bool {
    self.orders.changed().await.is_ok()
  }
}
