// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset of these helpers.

use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use storefront::backend::memory::InMemoryBackend;
use storefront::models::{Address, NewAddress, Product};
use storefront::{
  AdminConsole, CartEngine, KeyValueStorage, MemoryStorage, OrderHistory, OrderPlacement, SharedBackend,
  StorefrontSettings,
};
use tracing::Level;
use uuid::Uuid;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---

/// One device session over an in-process backend.
pub struct Shop {
  pub backend: Arc<InMemoryBackend>,
  pub storage: Arc<MemoryStorage>,
  pub cart: CartEngine,
  pub checkout: OrderPlacement,
  pub orders: OrderHistory,
  pub admin: AdminConsole,
}

impl Shop {
  pub fn new() -> Self {
    Self::with_backend(Arc::new(InMemoryBackend::new()))
  }

  /// A second device sharing `backend`, e.g. another browser tab.
  pub fn with_backend(backend: Arc<InMemoryBackend>) -> Self {
    let storage = Arc::new(MemoryStorage::new());
    let shared: SharedBackend = backend.clone();
    let kv: Arc<dyn KeyValueStorage> = storage.clone();
    let cart = CartEngine::new(shared.clone(), kv, Uuid::new_v4());
    let checkout = OrderPlacement::new(shared.clone(), cart.clone(), Arc::new(StorefrontSettings::default()));
    Self {
      orders: OrderHistory::new(shared.clone()),
      admin: AdminConsole::new(shared),
      backend,
      storage,
      cart,
      checkout,
    }
  }

  pub fn product(&self, title: &str, price_cents: i64) -> Product {
    self.backend.seed_product(title, price_cents)
  }

  /// A user with a profile and one shipping address.
  pub async fn customer(&self) -> (Uuid, Address) {
    let user_id = Uuid::new_v4();
    self.backend.create_profile(user_id, false);
    let address = self.address_for(user_id).await;
    (user_id, address)
  }

  pub async fn address_for(&self, user_id: Uuid) -> Address {
    use storefront::backend::ProfileBackend;
    self
      .backend
      .insert_address(
        user_id,
        NewAddress {
          full_name: "Asha Rao".to_string(),
          line1: "12 MG Road".to_string(),
          line2: None,
          city: "Bengaluru".to_string(),
          state: "KA".to_string(),
          postal_code: "560001".to_string(),
          phone: "9876543210".to_string(),
        },
      )
      .await
      .expect("seed address")
  }
}

/// Polls `check` until it holds or a second has passed.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
  for _ in 0..100 {
    if check() {
      return true;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  check()
}
