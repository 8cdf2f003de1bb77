// core/src/models/order.rs

use super::order_line::OrderLine;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fulfilment lifecycle. Transitions are made by an admin; nothing here
/// enforces their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  Placed,
  Confirmed,
  Packaging,
  OutForDelivery,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::Placed,
    OrderStatus::Confirmed,
    OrderStatus::Packaging,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Placed => "placed",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Packaging => "packaging",
      OrderStatus::OutForDelivery => "out_for_delivery",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      OrderStatus::Placed => "Order placed",
      OrderStatus::Confirmed => "Confirmed",
      OrderStatus::Packaging => "Packaging",
      OrderStatus::OutForDelivery => "Out for delivery",
      OrderStatus::Delivered => "Delivered",
      OrderStatus::Cancelled => "Cancelled",
    }
  }

  /// Coarse progress-bar percentage.
  pub fn progress(&self) -> u8 {
    match self {
      OrderStatus::Placed | OrderStatus::Confirmed => 25,
      OrderStatus::Packaging => 50,
      OrderStatus::OutForDelivery => 75,
      OrderStatus::Delivered => 100,
      OrderStatus::Cancelled => 0,
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = StoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| StoreError::Validation(format!("Unknown order status '{}'", s)))
  }
}

/// Payment state, independent of fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
  Pending,
  /// The buyer entered a UTR; waiting for an admin to check it.
  Submitted,
  Paid,
  Failed,
}

impl PaymentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Submitted => "submitted",
      PaymentStatus::Paid => "paid",
      PaymentStatus::Failed => "failed",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentStatus {
  type Err = StoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(PaymentStatus::Pending),
      "submitted" => Ok(PaymentStatus::Submitted),
      "paid" => Ok(PaymentStatus::Paid),
      "failed" => Ok(PaymentStatus::Failed),
      other => Err(StoreError::Validation(format!("Unknown payment status '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  /// 12-digit code shown to the buyer.
  pub order_id: String,
  pub user_id: Uuid,
  pub address_id: Uuid,
  pub amount_total_cents: i64,
  pub currency: String,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub payment_upi: String,
  pub payment_qr_expires_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub payment_utr: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithLines {
  #[serde(flatten)]
  pub order: Order,
  pub lines: Vec<OrderLine>,
}

/// Order header as written by the placement workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub order_id: String,
  pub user_id: Uuid,
  pub address_id: Uuid,
  pub amount_total_cents: i64,
  pub currency: String,
  pub payment_upi: String,
  pub payment_qr_expires_at: DateTime<Utc>,
}

/// The mutable subset of an order. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
  pub status: Option<OrderStatus>,
  pub payment_status: Option<PaymentStatus>,
  pub payment_utr: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn progress_follows_the_display_mapping() {
    assert_eq!(OrderStatus::Placed.progress(), 25);
    assert_eq!(OrderStatus::Confirmed.progress(), 25);
    assert_eq!(OrderStatus::Packaging.progress(), 50);
    assert_eq!(OrderStatus::OutForDelivery.progress(), 75);
    assert_eq!(OrderStatus::Delivered.progress(), 100);
    assert_eq!(OrderStatus::Cancelled.progress(), 0);
  }

  #[test]
  fn status_parses_its_wire_name() {
    for status in OrderStatus::ALL {
      assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
    }
    assert!("shipped".parse::<OrderStatus>().is_err());
  }

  #[test]
  fn serde_uses_snake_case() {
    let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
    assert_eq!(json, "\"out_for_delivery\"");
  }
}
