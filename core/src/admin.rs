// core/src/admin.rs

//! Admin console operations. Every call first checks `profiles.is_admin` for
//! the acting user.

use crate::backend::SharedBackend;
use crate::error::{StoreError, StoreResult};
use crate::models::{Order, OrderStatus, OrderUpdate, OrderWithLines, PaymentStatus, Product};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// How many recent orders the dashboard summarizes.
const DASHBOARD_WINDOW: i64 = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
  pub total_orders: usize,
  pub orders_by_status: BTreeMap<String, usize>,
  /// Sum of `amount_total_cents` over paid orders.
  pub paid_revenue_cents: i64,
  /// Orders whose payment is pending or submitted but not yet confirmed.
  pub awaiting_payment: usize,
}

impl DashboardSummary {
  pub fn from_orders(orders: &[OrderWithLines]) -> Self {
    let mut summary = DashboardSummary {
      total_orders: orders.len(),
      ..Default::default()
    };
    for OrderWithLines { order, .. } in orders {
      *summary.orders_by_status.entry(order.status.as_str().to_string()).or_default() += 1;
      match order.payment_status {
        PaymentStatus::Paid => summary.paid_revenue_cents += order.amount_total_cents,
        PaymentStatus::Pending | PaymentStatus::Submitted if order.status != OrderStatus::Cancelled => {
          summary.awaiting_payment += 1
        }
        _ => {}
      }
    }
    summary
  }
}

#[derive(Clone)]
pub struct AdminConsole {
  backend: SharedBackend,
}

impl AdminConsole {
  pub fn new(backend: SharedBackend) -> Self {
    Self { backend }
  }

  async fn ensure_admin(&self, actor: Uuid) -> StoreResult<()> {
    if self.backend.is_admin(actor).await? {
      Ok(())
    } else {
      warn!(%actor, "Admin operation refused.");
      Err(StoreError::Unauthorized("Admin role required".to_string()))
    }
  }

  pub async fn is_admin(&self, actor: Uuid) -> StoreResult<bool> {
    self.backend.is_admin(actor).await
  }

  #[instrument(name = "admin::list_orders", skip(self), err(Display))]
  pub async fn list_orders(&self, actor: Uuid, limit: i64) -> StoreResult<Vec<OrderWithLines>> {
    self.ensure_admin(actor).await?;
    self.backend.recent_orders(limit.clamp(1, DASHBOARD_WINDOW)).await
  }

  #[instrument(name = "admin::update_status", skip(self), err(Display))]
  pub async fn update_status(&self, actor: Uuid, order_id: Uuid, status: OrderStatus) -> StoreResult<Order> {
    self.ensure_admin(actor).await?;
    let order = self
      .backend
      .update_order(
        order_id,
        OrderUpdate {
          status: Some(status),
          ..OrderUpdate::default()
        },
      )
      .await?;
    info!(order_id = %order.order_id, status = %status, "Order status changed.");
    Ok(order)
  }

  /// Marks the payment as verified (`paid = true`) or rejected.
  #[instrument(name = "admin::confirm_payment", skip(self), err(Display))]
  pub async fn confirm_payment(&self, actor: Uuid, order_id: Uuid, paid: bool) -> StoreResult<Order> {
    self.ensure_admin(actor).await?;
    let payment_status = if paid { PaymentStatus::Paid } else { PaymentStatus::Failed };
    let order = self
      .backend
      .update_order(
        order_id,
        OrderUpdate {
          payment_status: Some(payment_status),
          ..OrderUpdate::default()
        },
      )
      .await?;
    info!(order_id = %order.order_id, payment_status = %payment_status, "Payment reviewed.");
    Ok(order)
  }

  /// Changes the live price. Carts pick it up on their next load; placed
  /// orders keep the price they were placed at.
  #[instrument(name = "admin::set_product_price", skip(self), err(Display))]
  pub async fn set_product_price(&self, actor: Uuid, product_id: Uuid, price_cents: i64) -> StoreResult<Product> {
    self.ensure_admin(actor).await?;
    if price_cents < 0 {
      return Err(StoreError::Validation("Price cannot be negative".to_string()));
    }
    self.backend.set_product_price(product_id, price_cents).await
  }

  #[instrument(name = "admin::set_stock", skip(self), err(Display))]
  pub async fn set_stock(&self, actor: Uuid, product_id: Uuid, stock_qty: i32, in_stock: bool) -> StoreResult<Product> {
    self.ensure_admin(actor).await?;
    if stock_qty < 0 {
      return Err(StoreError::Validation("Stock cannot be negative".to_string()));
    }
    self.backend.set_product_stock(product_id, stock_qty, in_stock).await
  }

  #[instrument(name = "admin::dashboard", skip(self), err(Display))]
  pub async fn dashboard(&self, actor: Uuid) -> StoreResult<DashboardSummary> {
    self.ensure_admin(actor).await?;
    let orders = self.backend.recent_orders(DASHBOARD_WINDOW).await?;
    Ok(DashboardSummary::from_orders(&orders))
  }
}
