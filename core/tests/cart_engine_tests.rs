// tests/cart_engine_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront::backend::memory::FaultPoint;
use storefront::{ErrorKind, NoticeLevel, Owner, StoreError};
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_anonymous_add_increments_existing_line() {
  setup_tracing();
  let shop = Shop::new();
  let tee = shop.product("Tee", 50_000);

  shop.cart.add_to_cart(tee.id, 1).await.unwrap();
  let view = shop.cart.add_to_cart(tee.id, 2).await.unwrap();

  assert_eq!(view.lines.len(), 1);
  assert_eq!(view.qty_of(tee.id), 3);
  assert_eq!(view.total_items, 3);
  assert_eq!(view.total_amount_cents, 150_000);
  assert!(matches!(view.owner, Owner::Anonymous { .. }));
}

#[tokio::test]
#[serial]
async fn test_totals_follow_lines() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let b = shop.product("B", 5_000);

  shop.cart.add_to_cart(a.id, 2).await.unwrap();
  let view = shop.cart.add_to_cart(b.id, 1).await.unwrap();

  assert_eq!(view.total_items, 3);
  assert_eq!(view.total_amount_cents, 25_000);
  assert_eq!(shop.cart.view(), view);
}

#[tokio::test]
#[serial]
async fn test_update_to_zero_is_remove() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let b = shop.product("B", 5_000);
  shop.cart.add_to_cart(a.id, 2).await.unwrap();
  shop.cart.add_to_cart(b.id, 1).await.unwrap();

  let view = shop.cart.update_quantity(a.id, 0).await.unwrap();
  assert!(view.line(a.id).is_none());
  assert_eq!(view.qty_of(b.id), 1);

  let view = shop.cart.update_quantity(b.id, 4).await.unwrap();
  assert_eq!(view.qty_of(b.id), 4);
  assert_eq!(view.total_amount_cents, 20_000);
}

#[tokio::test]
#[serial]
async fn test_remove_absent_product_and_double_clear_are_noops() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  shop.cart.add_to_cart(a.id, 1).await.unwrap();

  let view = shop.cart.remove_from_cart(Uuid::new_v4()).await.unwrap();
  assert_eq!(view.qty_of(a.id), 1);

  assert!(shop.cart.clear_cart().await.unwrap().is_empty());
  assert!(shop.cart.clear_cart().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_add_rejects_unknown_out_of_stock_and_non_positive() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);

  let err = shop.cart.add_to_cart(Uuid::new_v4(), 1).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let err = shop.cart.add_to_cart(a.id, 0).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  shop.mark_out_of_stock(a.id).await;
  let err = shop.cart.add_to_cart(a.id, 1).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(shop.cart.view().is_empty());
}

#[tokio::test]
#[serial]
async fn test_mutations_emit_notices() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("Mug", 30_000);
  let mut notices = shop.cart.notices();

  shop.cart.add_to_cart(a.id, 1).await.unwrap();
  let notice = notices.recv().await.unwrap();
  assert_eq!(notice.level, NoticeLevel::Info);
  assert!(notice.message.contains("Mug"));

  let _ = shop.cart.add_to_cart(Uuid::new_v4(), 1).await;
  let notice = notices.recv().await.unwrap();
  assert_eq!(notice.level, NoticeLevel::Error);
  assert_eq!(notice.error_kind, Some(ErrorKind::NotFound));
}

#[tokio::test]
#[serial]
async fn test_local_cart_survives_a_new_engine_on_the_same_device() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  shop.cart.add_to_cart(a.id, 2).await.unwrap();

  let again = storefront::CartEngine::new(shop.backend.clone(), shop.storage.clone(), Uuid::new_v4());
  assert_eq!(again.view().qty_of(a.id), 2);
}

#[tokio::test]
#[serial]
async fn test_signed_in_add_uses_increment_on_remote() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, _) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();

  shop.cart.add_to_cart(a.id, 1).await.unwrap();
  let view = shop.cart.add_to_cart(a.id, 2).await.unwrap();

  assert_eq!(shop.backend.cart_rows(user_id), vec![(a.id, 3)]);
  assert_eq!(view.qty_of(a.id), 3);
}

#[tokio::test]
#[serial]
async fn test_remote_failure_surfaces_as_transient_error() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, _) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();
  shop.cart.add_to_cart(a.id, 1).await.unwrap();

  shop.backend.fail_next(FaultPoint::SetCartItem);
  let err = shop.cart.update_quantity(a.id, 5).await.unwrap_err();
  assert!(matches!(err, StoreError::TransientIo { .. }));
  assert_eq!(shop.cart.view().qty_of(a.id), 1);
}

#[tokio::test]
#[serial]
async fn test_failed_remote_refresh_shows_empty_cart() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 10_000);
  let (user_id, _) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();
  shop.cart.add_to_cart(a.id, 1).await.unwrap();

  shop.backend.fail_next(FaultPoint::CartLines);
  assert!(shop.cart.refresh().await.is_empty());
  assert_eq!(shop.cart.refresh().await.qty_of(a.id), 1);
}

#[tokio::test]
#[serial]
async fn test_add_past_max_quantity_is_rejected_on_both_stores() {
  setup_tracing();
  let shop = Shop::new();
  let a = shop.product("A", 1);

  shop.cart.add_to_cart(a.id, i32::MAX).await.unwrap();
  let err = shop.cart.add_to_cart(a.id, 1).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert_eq!(shop.cart.view().qty_of(a.id), i32::MAX);

  let (user_id, _) = shop.customer().await;
  shop.cart.sign_in(user_id).await.unwrap();
  assert_eq!(shop.backend.cart_rows(user_id), vec![(a.id, i32::MAX)]);

  let err = shop.cart.add_to_cart(a.id, 1).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert_eq!(shop.backend.cart_rows(user_id), vec![(a.id, i32::MAX)]);
}

impl Shop {
  async fn mark_out_of_stock(&self, product_id: Uuid) {
    use storefront::backend::CatalogBackend;
    self.backend.set_product_stock(product_id, 0, false).await.unwrap();
  }
}
