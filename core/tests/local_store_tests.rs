// tests/local_store_tests.rs
mod common;

use common::setup_tracing;
use std::sync::Arc;
use storefront::local_store::LOCAL_CART_KEY;
use storefront::{CartLine, FileStorage, KeyValueStorage, LocalCartStore};
use uuid::Uuid;

fn line(title: &str, price_cents: i64) -> CartLine {
  CartLine {
    id: Uuid::new_v4(),
    product_id: Uuid::new_v4(),
    title: title.to_string(),
    price_cents,
    qty: 1,
    images: vec![],
  }
}

#[test]
fn test_file_storage_persists_across_instances() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let a = line("A", 10_000);

  let store = LocalCartStore::new(Arc::new(FileStorage::new(dir.path()).unwrap()));
  store.add(a.clone(), 2).unwrap();

  let reopened = LocalCartStore::new(Arc::new(FileStorage::new(dir.path()).unwrap()));
  let lines = reopened.get();
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0].product_id, a.product_id);
  assert_eq!(lines[0].qty, 2);
}

#[test]
fn test_corrupt_document_reads_as_empty_cart() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let storage = Arc::new(FileStorage::new(dir.path()).unwrap());
  storage.set(LOCAL_CART_KEY, "{not json").unwrap();

  let store = LocalCartStore::new(storage.clone());
  assert!(store.get().is_empty());

  // The next write replaces the corrupt document.
  let a = line("A", 10_000);
  store.add(a.clone(), 1).unwrap();
  assert_eq!(store.get()[0].product_id, a.product_id);
}

#[test]
fn test_clear_missing_document_is_fine() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let storage = FileStorage::new(dir.path().join("nested")).unwrap();
  assert_eq!(storage.get(LOCAL_CART_KEY).unwrap(), None);
  storage.remove(LOCAL_CART_KEY).unwrap();

  let store = LocalCartStore::new(Arc::new(storage));
  store.clear();
  assert!(store.get().is_empty());
}

#[test]
fn test_set_qty_and_remove() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let store = LocalCartStore::new(Arc::new(FileStorage::new(dir.path()).unwrap()));
  let a = line("A", 10_000);
  let b = line("B", 5_000);
  store.add(a.clone(), 1).unwrap();
  store.add(b.clone(), 1).unwrap();

  let lines = store.set_qty(a.product_id, 5);
  assert_eq!(lines.iter().find(|l| l.product_id == a.product_id).map(|l| l.qty), Some(5));

  // Setting the quantity of an absent product adds nothing.
  assert_eq!(store.set_qty(Uuid::new_v4(), 3).len(), 2);

  let lines = store.set_qty(a.product_id, 0);
  assert_eq!(lines.len(), 1);
  assert_eq!(store.remove(b.product_id).len(), 0);
  assert_eq!(store.remove(b.product_id).len(), 0);
}

#[test]
fn test_add_past_max_quantity_is_rejected() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let store = LocalCartStore::new(Arc::new(FileStorage::new(dir.path()).unwrap()));
  let a = line("A", 10_000);
  store.add(a.clone(), i32::MAX).unwrap();

  let err = store.add(a.clone(), 1).unwrap_err();
  assert_eq!(err.kind(), storefront::ErrorKind::Validation);
  // The stored line keeps its last valid quantity.
  assert_eq!(store.get()[0].qty, i32::MAX);
}
