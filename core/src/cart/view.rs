// core/src/cart/view.rs

use crate::models::{CartLine, Owner};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use uuid::Uuid;

/// What the UI renders: one owner's lines plus derived totals.
///
/// Totals are always computed from `lines` at construction; nothing stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
  pub owner: Owner,
  pub lines: Vec<CartLine>,
  pub total_items: i64,
  pub total_amount_cents: i64,
}

impl CartView {
  pub fn new(owner: Owner, lines: Vec<CartLine>) -> Self {
    let total_items = lines.iter().map(|l| i64::from(l.qty)).sum();
    let total_amount_cents = lines.iter().map(CartLine::subtotal_cents).sum();
    Self {
      owner,
      lines,
      total_items,
      total_amount_cents,
    }
  }

  pub fn empty(owner: Owner) -> Self {
    Self::new(owner, Vec::new())
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
    self.lines.iter().find(|l| l.product_id == product_id)
  }

  /// Quantity of `product_id` in the cart, 0 when absent.
  pub fn qty_of(&self, product_id: Uuid) -> i32 {
    self.line(product_id).map_or(0, |l| l.qty)
  }
}

/// The single rendered view, updated last-write-wins by load ticket.
///
/// Every load takes a ticket before it starts; a result is only published if
/// no load that started later has been published already.
pub(crate) struct ViewSlot {
  tx: watch::Sender<CartView>,
  applied: Mutex<u64>,
  next_ticket: AtomicU64,
}

impl ViewSlot {
  pub(crate) fn new(initial: CartView) -> Self {
    let (tx, _) = watch::channel(initial);
    Self {
      tx,
      applied: Mutex::new(0),
      next_ticket: AtomicU64::new(0),
    }
  }

  pub(crate) fn ticket(&self) -> u64 {
    self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
  }

  /// Publishes `view` unless a newer ticket already won. Returns whether it did.
  pub(crate) fn apply(&self, ticket: u64, view: CartView) -> bool {
    let mut applied = self.applied.lock();
    if ticket <= *applied {
      tracing::debug!(ticket, applied = *applied, "Superseded cart load dropped.");
      return false;
    }
    *applied = ticket;
    self.tx.send_replace(view);
    true
  }

  pub(crate) fn current(&self) -> CartView {
    self.tx.borrow().clone()
  }

  pub(crate) fn subscribe(&self) -> watch::Receiver<CartView> {
    self.tx.subscribe()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(price_cents: i64, qty: i32) -> CartLine {
    CartLine {
      id: Uuid::new_v4(),
      product_id: Uuid::new_v4(),
      title: "x".to_string(),
      price_cents,
      qty,
      images: vec![],
    }
  }

  #[test]
  fn totals_are_derived_from_lines() {
    let owner = Owner::Anonymous { device_id: Uuid::new_v4() };
    let view = CartView::new(owner, vec![line(10_000, 2), line(5_000, 1)]);
    assert_eq!(view.total_items, 3);
    assert_eq!(view.total_amount_cents, 25_000);
  }

  #[test]
  fn older_ticket_never_overwrites_newer_one() {
    let owner = Owner::Anonymous { device_id: Uuid::new_v4() };
    let slot = ViewSlot::new(CartView::empty(owner));
    let slow = slot.ticket();
    let fast = slot.ticket();

    assert!(slot.apply(fast, CartView::new(owner, vec![line(100, 1)])));
    assert!(!slot.apply(slow, CartView::empty(owner)));
    assert_eq!(slot.current().total_items, 1);
  }
}
