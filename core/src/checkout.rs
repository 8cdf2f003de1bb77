// core/src/checkout.rs

//! Order placement: turns the signed-in user's cart into an immutable order.
//!
//! Steps, in order:
//!  1. `validate_checkout`  - signed in, address belongs to the buyer, cart not empty.
//!  2. `snapshot_cart`      - freeze each line's title/price/qty into an order line.
//!  3. `generate_order_id`  - ask the backend for a fresh 12-digit code.
//!  4. `persist_order`      - header + lines in one atomic backend write.
//!  5. `clear_cart`         - empty the cart that produced the order.
//!
//! A failure in steps 1-4 leaves no order behind and the cart untouched, so
//! the buyer can simply retry. Once step 4 succeeded the order stands; a
//! failure to clear the cart is logged and does not undo it.

use crate::backend::SharedBackend;
use crate::cart::{CartEngine, Notice};
use crate::error::{StoreError, StoreResult};
use crate::models::{CartLine, NewOrder, NewOrderLine, Owner, OrderWithLines};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult};
use crate::settings::StorefrontSettings;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct CheckoutCtxData {
  pub backend: SharedBackend,
  pub cart: CartEngine,
  pub settings: Arc<StorefrontSettings>,
  pub address_id: Uuid,
  pub user_id: Option<Uuid>,
  pub lines: Vec<CartLine>,
  pub snapshot: Vec<NewOrderLine>,
  pub amount_total_cents: i64,
  pub order_code: Option<String>,
  pub placed: Option<OrderWithLines>,
}

/// Entry point for checkout. One per session, next to its [`CartEngine`].
#[derive(Clone)]
pub struct OrderPlacement {
  backend: SharedBackend,
  cart: CartEngine,
  settings: Arc<StorefrontSettings>,
  pipeline: Arc<Pipeline<CheckoutCtxData, StoreError>>,
}

impl OrderPlacement {
  pub fn new(backend: SharedBackend, cart: CartEngine, settings: Arc<StorefrontSettings>) -> Self {
    Self {
      backend,
      cart,
      settings,
      pipeline: Arc::new(checkout_pipeline()),
    }
  }

  /// Places an order for the active cart, shipped to `address_id`.
  #[instrument(name = "checkout::place_order", skip(self))]
  pub async fn place_order(&self, address_id: Uuid) -> StoreResult<OrderWithLines> {
    let ctx_data = ContextData::new(CheckoutCtxData {
      backend: self.backend.clone(),
      cart: self.cart.clone(),
      settings: self.settings.clone(),
      address_id,
      user_id: None,
      lines: Vec::new(),
      snapshot: Vec::new(),
      amount_total_cents: 0,
      order_code: None,
      placed: None,
    });

    match self.pipeline.run(ctx_data.clone()).await {
      Ok(PipelineResult::Completed) => {}
      Ok(PipelineResult::Stopped) => {
        return Err(StoreError::Internal("Checkout stopped before the order was placed".to_string()));
      }
      Err(e) => {
        warn!(error = %e, "Checkout failed; cart left as it was.");
        return Err(e);
      }
    }

    let placed = ctx_data
      .read()
      .placed
      .clone()
      .ok_or_else(|| StoreError::Internal("Checkout completed without an order".to_string()))?;
    Ok(placed)
  }
}

/// Freezes cart lines into order lines. The returned total is the sum of the
/// frozen subtotals, so it always agrees with the lines.
pub fn snapshot_lines(lines: &[CartLine]) -> (Vec<NewOrderLine>, i64) {
  let snapshot: Vec<NewOrderLine> = lines
    .iter()
    .map(|line| NewOrderLine {
      product_id: line.product_id,
      title: line.title.clone(),
      unit_price_cents: line.price_cents,
      qty: line.qty,
      subtotal_cents: line.subtotal_cents(),
    })
    .collect();
  let total = snapshot.iter().map(|l| l.subtotal_cents).sum();
  (snapshot, total)
}

pub(crate) fn checkout_pipeline() -> Pipeline<CheckoutCtxData, StoreError> {
  let mut p = Pipeline::<CheckoutCtxData, StoreError>::new(&[
    ("validate_checkout", false),
    ("snapshot_cart", false),
    ("generate_order_id", false),
    ("persist_order", false),
    ("clear_cart", false),
  ]);

  // Step 1: preconditions
  p.on_root("validate_checkout", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (backend, cart, address_id) = {
        let guard = ctx_data.read();
        (guard.backend.clone(), guard.cart.clone(), guard.address_id)
      };

      let user_id = match cart.owner() {
        Owner::User { user_id } => user_id,
        Owner::Anonymous { .. } => {
          return Err(StoreError::Unauthorized("Sign in to place an order".to_string()));
        }
      };

      match backend.address(address_id).await? {
        Some(address) if address.user_id == user_id => {}
        // Someone else's address is reported exactly like a missing one.
        _ => return Err(StoreError::NotFound(format!("Address {} not found", address_id))),
      }

      let lines = cart.current_lines().await?;
      if lines.is_empty() {
        return Err(StoreError::Validation("Cart is empty".to_string()));
      }
      if let Some(bad) = lines.iter().find(|l| l.qty < 1) {
        return Err(StoreError::Validation(format!("Invalid quantity for {}", bad.title)));
      }

      info!(%user_id, lines = lines.len(), "Checkout preconditions met.");
      let mut guard = ctx_data.write();
      guard.user_id = Some(user_id);
      guard.lines = lines;
      Ok::<_, StoreError>(PipelineControl::Continue)
    })
  });

  // Step 2: freeze commercial terms
  p.on_root("snapshot_cart", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let (snapshot, total) = snapshot_lines(&guard.lines);
      guard.snapshot = snapshot;
      guard.amount_total_cents = total;
      info!(amount_total_cents = total, "Cart snapshot taken.");
      Ok::<_, StoreError>(PipelineControl::Continue)
    })
  });

  // Step 3: order code
  p.on_root("generate_order_id", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let backend = ctx_data.read().backend.clone();
      let code = backend.generate_order_id().await?;
      info!(order_id = %code, "Order id generated.");
      ctx_data.write().order_code = Some(code);
      Ok::<_, StoreError>(PipelineControl::Continue)
    })
  });

  // Step 4: header + lines, atomically
  p.on_root("persist_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (backend, new_order, lines) = {
        let guard = ctx_data.read();
        let user_id = guard
          .user_id
          .ok_or_else(|| StoreError::Internal("persist_order ran without a validated user".to_string()))?;
        let order_id = guard
          .order_code
          .clone()
          .ok_or_else(|| StoreError::Internal("persist_order ran without an order id".to_string()))?;
        let new_order = NewOrder {
          order_id,
          user_id,
          address_id: guard.address_id,
          amount_total_cents: guard.amount_total_cents,
          currency: guard.settings.currency.clone(),
          payment_upi: guard.settings.payment_upi_handle.clone(),
          payment_qr_expires_at: Utc::now() + guard.settings.payment_qr_ttl,
        };
        (guard.backend.clone(), new_order, guard.snapshot.clone())
      };

      let placed = backend.insert_order(new_order, lines).await.map_err(|e| {
        error!(error = %e, "Order could not be persisted.");
        e
      })?;
      info!(order_id = %placed.order.order_id, id = %placed.order.id, "Order placed.");
      ctx_data.write().placed = Some(placed);
      Ok::<_, StoreError>(PipelineControl::Continue)
    })
  });

  // Step 5: empty the source cart
  p.on_root("clear_cart", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (cart, order_code) = {
        let guard = ctx_data.read();
        (guard.cart.clone(), guard.order_code.clone().unwrap_or_default())
      };
      if let Err(e) = cart.clear_cart().await {
        // The order is already placed; leftovers in the cart are only cosmetic.
        warn!(error = %e, order_id = %order_code, "Cart not cleared after placing the order.");
      }
      cart.notify(Notice::info(format!("Order {} placed", order_code)));
      Ok::<_, StoreError>(PipelineControl::Continue)
    })
  });

  p
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn snapshot_copies_terms_and_sums_subtotals() {
    let lines = vec![
      CartLine {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        title: "A".to_string(),
        price_cents: 10_000,
        qty: 2,
        images: vec![],
      },
      CartLine {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        title: "B".to_string(),
        price_cents: 5_000,
        qty: 1,
        images: vec![],
      },
    ];
    let (snapshot, total) = snapshot_lines(&lines);
    assert_eq!(total, 25_000);
    assert_eq!(snapshot[0].subtotal_cents, 20_000);
    assert_eq!(snapshot[1].subtotal_cents, 5_000);
    assert_eq!(snapshot[0].title, "A");
  }

  #[test]
  fn pipeline_declares_steps_in_order() {
    let p = checkout_pipeline();
    assert_eq!(
      p.step_names(),
      vec!["validate_checkout", "snapshot_cart", "generate_order_id", "persist_order", "clear_cart"]
    );
  }
}
