// core/src/realtime.rs

//! Change-feed plumbing.
//!
//! The hosted backend pushes "rows changed" notifications per table. Consumers
//! never patch state from the event payload; they reload. That is why a
//! subscription may coalesce or duplicate events freely.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  Products,
  Banners,
  CartItems,
  Orders,
  OrderItems,
}

impl Table {
  pub fn as_str(&self) -> &'static str {
    match self {
      Table::Products => "products",
      Table::Banners => "banners",
      Table::CartItems => "cart_items",
      Table::Orders => "orders",
      Table::OrderItems => "order_items",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "products" => Some(Table::Products),
      "banners" => Some(Table::Banners),
      "cart_items" => Some(Table::CartItems),
      "orders" => Some(Table::Orders),
      "order_items" => Some(Table::OrderItems),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
  Insert,
  Update,
  Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
  pub table: Table,
  pub kind: ChangeKind,
  /// Owner of the changed row, for owner-scoped tables.
  pub user_id: Option<Uuid>,
}

/// Fan-out point for change events. Backends publish into it; subscribers
/// filter by table and owner.
#[derive(Debug, Clone)]
pub struct ChangeHub {
  sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeHub {
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { sender }
  }

  pub fn publish(&self, event: ChangeEvent) {
    // No receivers is the normal idle state.
    let receivers = self.sender.send(event).unwrap_or(0);
    tracing::trace!(table = event.table.as_str(), kind = ?event.kind, receivers, "Change event published.");
  }

  pub fn subscribe(&self, table: Table, user_filter: Option<Uuid>) -> ChangeSubscription {
    ChangeSubscription {
      receiver: self.sender.subscribe(),
      table,
      user_filter,
    }
  }
}

impl Default for ChangeHub {
  fn default() -> Self {
    Self::new(256)
  }
}

/// A lazy sequence of change events for one table, optionally scoped to an owner.
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct ChangeSubscription {
  receiver: broadcast::Receiver<ChangeEvent>,
  table: Table,
  user_filter: Option<Uuid>,
}

impl ChangeSubscription {
  pub fn table(&self) -> Table {
    self.table
  }

  pub fn user_filter(&self) -> Option<Uuid> {
    self.user_filter
  }

  fn matches(&self, event: &ChangeEvent) -> bool {
    if event.table != self.table {
      return false;
    }
    // An event without an owner concerns every subscriber of the table.
    match (self.user_filter, event.user_id) {
      (Some(user_id), Some(owner)) => owner == user_id,
      _ => true,
    }
  }

  /// Waits for the next matching event. `None` once the feed is closed.
  ///
  /// If the subscriber fell behind, the missed events are reported as one
  /// synthetic `Update`.
  pub async fn next(&mut self) -> Option<ChangeEvent> {
    loop {
      match self.receiver.recv().await {
        Ok(event) if self.matches(&event) => return Some(event),
        Ok(_) => continue,
        Err(RecvError::Lagged(missed)) => {
          tracing::warn!(table = self.table.as_str(), missed, "Change subscription lagged; coalescing.");
          return Some(ChangeEvent {
            table: self.table,
            kind: ChangeKind::Update,
            user_id: self.user_filter,
          });
        }
        Err(RecvError::Closed) => return None,
      }
    }
  }

  /// A fresh subscription with the same filter, starting from "now".
  pub fn resubscribe(&self) -> Self {
    Self {
      receiver: self.receiver.resubscribe(),
      table: self.table,
      user_filter: self.user_filter,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn subscription_skips_other_owners_and_tables() {
    let hub = ChangeHub::new(16);
    let me = Uuid::new_v4();
    let mut sub = hub.subscribe(Table::CartItems, Some(me));

    hub.publish(ChangeEvent { table: Table::CartItems, kind: ChangeKind::Insert, user_id: Some(Uuid::new_v4()) });
    hub.publish(ChangeEvent { table: Table::Orders, kind: ChangeKind::Insert, user_id: Some(me) });
    hub.publish(ChangeEvent { table: Table::CartItems, kind: ChangeKind::Delete, user_id: Some(me) });

    let event = sub.next().await.unwrap();
    assert_eq!(event.kind, ChangeKind::Delete);
    assert_eq!(event.user_id, Some(me));
  }

  #[tokio::test]
  async fn ownerless_event_reaches_owner_filtered_subscriber() {
    let hub = ChangeHub::new(16);
    let mut sub = hub.subscribe(Table::Orders, Some(Uuid::new_v4()));
    hub.publish(ChangeEvent { table: Table::Orders, kind: ChangeKind::Update, user_id: None });
    assert_eq!(sub.next().await.unwrap().user_id, None);
  }

  #[tokio::test]
  async fn lagging_subscriber_gets_one_coalesced_event() {
    let hub = ChangeHub::new(2);
    let mut sub = hub.subscribe(Table::Products, None);
    for _ in 0..5 {
      hub.publish(ChangeEvent { table: Table::Products, kind: ChangeKind::Insert, user_id: None });
    }
    let event = sub.next().await.unwrap();
    assert_eq!(event.kind, ChangeKind::Update);
  }
}
