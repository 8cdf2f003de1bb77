// tests/orders_admin_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront::backend::memory::FaultPoint;
use storefront::{ErrorKind, OrderStatus, OrderWithLines, PaymentStatus};
use uuid::Uuid;

async fn place(shop: &Shop, address_id: Uuid, product_id: Uuid, qty: i32) -> OrderWithLines {
  shop.cart.add_to_cart(product_id, qty).await.unwrap();
  shop.checkout.place_order(address_id).await.unwrap()
}

#[tokio::test]
#[serial]
async fn test_history_is_newest_first() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();

  let first = place(&shop, address.id, a.id, 1).await;
  let second = place(&shop, address.id, a.id, 2).await;

  let history = shop.orders.load(user_id).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].order.id, second.order.id);
  assert_eq!(history[1].order.id, first.order.id);
  assert_eq!(history[0].lines.len(), 1);

  // Other users see nothing of it.
  assert!(shop.orders.load(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_history_read_failure_is_empty() {
  setup_tracing();
  let shop = Shop::new();
  let (user_id, _) = shop.customer().await;
  shop.backend.fail_next(FaultPoint::OrdersForUser);
  assert!(shop.orders.load_or_empty(user_id).await.is_empty());
}

#[tokio::test]
#[serial]
async fn test_payment_reference_submission() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();
  let placed = place(&shop, address.id, a.id, 1).await;

  let err = shop
    .orders
    .submit_payment_reference(user_id, placed.order.id, "12345")
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let err = shop
    .orders
    .submit_payment_reference(Uuid::new_v4(), placed.order.id, "123456789012")
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let order = shop
    .orders
    .submit_payment_reference(user_id, placed.order.id, " 123456789012 ")
    .await
    .unwrap();
  assert_eq!(order.payment_status, PaymentStatus::Submitted);
  assert_eq!(order.payment_utr.as_deref(), Some("123456789012"));
}

#[tokio::test]
#[serial]
async fn test_admin_operations_require_admin_profile() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, _) = shop.customer().await;

  let err = shop.admin.list_orders(user_id, 10).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Unauthorized);
  let err = shop.admin.set_product_price(user_id, a.id, 1).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Unauthorized);
  let err = shop.admin.dashboard(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Unauthorized);

  assert!(!shop.admin.is_admin(user_id).await.unwrap());
  let admin_id = Uuid::new_v4();
  shop.backend.create_profile(admin_id, true);
  assert!(shop.admin.is_admin(admin_id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_admin_status_and_payment_flow_reaches_buyer_feed() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;
  let admin_id = Uuid::new_v4();
  shop.backend.create_profile(admin_id, true);
  shop.cart.sign_in(user_id).await.unwrap();
  let placed = place(&shop, address.id, a.id, 3).await;

  let feed = shop.orders.watch(user_id).await;
  assert_eq!(feed.current()[0].order.status, OrderStatus::Placed);

  let order = shop
    .admin
    .update_status(admin_id, placed.order.id, OrderStatus::OutForDelivery)
    .await
    .unwrap();
  assert_eq!(order.status.label(), "Out for delivery");
  assert_eq!(order.status.progress(), 75);

  let feed_view = feed.clone();
  assert!(eventually(|| feed_view.current()[0].order.status == OrderStatus::OutForDelivery).await);

  let order = shop.admin.confirm_payment(admin_id, placed.order.id, true).await.unwrap();
  assert_eq!(order.payment_status, PaymentStatus::Paid);

  // Paid orders take no further payment references.
  let err = shop
    .orders
    .submit_payment_reference(user_id, placed.order.id, "123456789012")
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let listed = shop.admin.list_orders(admin_id, 10).await.unwrap();
  assert_eq!(listed.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_dashboard_summarizes_orders() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;
  let admin_id = Uuid::new_v4();
  shop.backend.create_profile(admin_id, true);
  shop.cart.sign_in(user_id).await.unwrap();

  let paid = place(&shop, address.id, a.id, 2).await;
  let _pending = place(&shop, address.id, a.id, 1).await;
  let cancelled = place(&shop, address.id, a.id, 1).await;
  shop.admin.confirm_payment(admin_id, paid.order.id, true).await.unwrap();
  shop
    .admin
    .update_status(admin_id, cancelled.order.id, OrderStatus::Cancelled)
    .await
    .unwrap();

  let summary = shop.admin.dashboard(admin_id).await.unwrap();
  assert_eq!(summary.total_orders, 3);
  assert_eq!(summary.paid_revenue_cents, 20_000);
  assert_eq!(summary.awaiting_payment, 1);
  assert_eq!(summary.orders_by_status.get("placed"), Some(&2));
  assert_eq!(summary.orders_by_status.get("cancelled"), Some(&1));
}

#[tokio::test]
#[serial]
async fn test_admin_catalog_edits_reflect_in_cart() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, _) = shop.customer().await;
  let admin_id = Uuid::new_v4();
  shop.backend.create_profile(admin_id, true);
  shop.cart.sign_in(user_id).await.unwrap();
  shop.cart.add_to_cart(a.id, 2).await.unwrap();

  let err = shop.admin.set_product_price(admin_id, a.id, -1).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let product = shop.admin.set_product_price(admin_id, a.id, 12_000).await.unwrap();
  assert_eq!(product.price_cents, 12_000);
  // Remote carts are read joined with products, so the next load shows the new price.
  assert_eq!(shop.cart.refresh().await.total_amount_cents, 24_000);

  let product = shop.admin.set_stock(admin_id, a.id, 0, false).await.unwrap();
  assert!(!product.in_stock);
  assert_eq!(shop.cart.add_to_cart(a.id, 1).await.unwrap_err().kind(), ErrorKind::Validation);
}
