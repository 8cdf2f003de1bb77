// tests/checkout_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront::backend::memory::FaultPoint;
use storefront::backend::CatalogBackend;
use storefront::order_code;
use storefront::{ErrorKind, OrderStatus, PaymentStatus};
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_place_order_snapshots_lines_and_empties_cart() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let b = shop.product("B", 5_000);
  let (user_id, address) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();
  shop.cart.add_to_cart(a.id, 2).await.unwrap();
  shop.cart.add_to_cart(b.id, 1).await.unwrap();

  let placed = shop.checkout.place_order(address.id).await.unwrap();

  assert_eq!(placed.order.amount_total_cents, 25_000);
  assert_eq!(placed.order.status, OrderStatus::Placed);
  assert_eq!(placed.order.payment_status, PaymentStatus::Pending);
  assert_eq!(placed.order.address_id, address.id);
  assert!(order_code::is_well_formed(&placed.order.order_id));
  assert!(placed.order.payment_qr_expires_at > placed.order.created_at);

  let line_a = placed.lines.iter().find(|l| l.product_id == a.id).unwrap();
  let line_b = placed.lines.iter().find(|l| l.product_id == b.id).unwrap();
  assert_eq!((line_a.qty, line_a.subtotal_cents), (2, 20_000));
  assert_eq!((line_b.qty, line_b.subtotal_cents), (1, 5_000));
  assert_eq!(placed.lines.iter().map(|l| l.subtotal_cents).sum::<i64>(), placed.order.amount_total_cents);

  assert!(shop.backend.cart_rows(user_id).is_empty());
  assert!(shop.cart.view().is_empty());
}

#[tokio::test]
#[serial]
async fn test_later_price_change_does_not_touch_placed_order() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();
  shop.cart.add_to_cart(a.id, 1).await.unwrap();
  let placed = shop.checkout.place_order(address.id).await.unwrap();

  shop.backend.set_product_price(a.id, 99_000).await.unwrap();

  let history = shop.orders.load(user_id).await.unwrap();
  assert_eq!(history[0].order.id, placed.order.id);
  assert_eq!(history[0].lines[0].unit_price_cents, 10_000);
  assert_eq!(history[0].order.amount_total_cents, 10_000);
}

#[tokio::test]
#[serial]
async fn test_failed_persist_leaves_no_order_and_keeps_cart() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();
  shop.cart.add_to_cart(a.id, 2).await.unwrap();

  shop.backend.fail_next(FaultPoint::InsertOrder);
  let err = shop.checkout.place_order(address.id).await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::TransientIo);
  assert_eq!(shop.backend.order_count(), 0);
  assert_eq!(shop.backend.cart_rows(user_id), vec![(a.id, 2)]);

  // The buyer can simply retry.
  let placed = shop.checkout.place_order(address.id).await.unwrap();
  assert_eq!(placed.order.amount_total_cents, 20_000);
  assert_eq!(shop.backend.order_count(), 1);
}

#[tokio::test]
#[serial]
async fn test_failed_cart_clear_keeps_the_order() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();
  shop.cart.add_to_cart(a.id, 1).await.unwrap();

  shop.backend.fail_next(FaultPoint::DeleteCartItems);
  let placed = shop.checkout.place_order(address.id).await.unwrap();

  assert_eq!(shop.backend.order_count(), 1);
  assert_eq!(placed.order.amount_total_cents, 10_000);
  assert_eq!(shop.backend.cart_rows(user_id), vec![(a.id, 1)]);
}

#[tokio::test]
#[serial]
async fn test_checkout_preconditions() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;

  // Anonymous.
  shop.cart.add_to_cart(a.id, 1).await.unwrap();
  let err = shop.checkout.place_order(address.id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Unauthorized);

  // Signed in, empty cart.
  shop.cart.sign_in(user_id).await.unwrap();
  shop.cart.clear_cart().await.unwrap();
  let err = shop.checkout.place_order(address.id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  // Someone else's address, or none at all.
  shop.cart.add_to_cart(a.id, 1).await.unwrap();
  let stranger = Uuid::new_v4();
  let foreign = shop.address_for(stranger).await;
  let err = shop.checkout.place_order(foreign.id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  let err = shop.checkout.place_order(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  assert_eq!(shop.backend.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_order_ids_are_distinct() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, address) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();

  let mut codes = Vec::new();
  for _ in 0..5 {
    shop.cart.add_to_cart(a.id, 1).await.unwrap();
    codes.push(shop.checkout.place_order(address.id).await.unwrap().order.order_id);
  }
  codes.sort();
  codes.dedup();
  assert_eq!(codes.len(), 5);
}
