// app/src/state.rs

use crate::config::AppConfig;
use crate::errors::Result;
use std::sync::Arc;
use storefront::{
  AdminConsole, CartEngine, CatalogReader, FileStorage, KeyValueStorage, OrderHistory, OrderPlacement, SharedBackend,
};
use uuid::Uuid;

const DEVICE_ID_KEY: &str = "storefront.device_id";

/// One device session, shared by every request.
#[derive(Clone)]
pub struct AppState {
  pub backend: SharedBackend,
  pub catalog: CatalogReader,
  pub cart: CartEngine,
  pub checkout: OrderPlacement,
  pub orders: OrderHistory,
  pub admin: AdminConsole,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn build(config: Arc<AppConfig>, backend: SharedBackend) -> Result<Self> {
    let storage = Arc::new(FileStorage::new(&config.data_dir)?);
    let device_id = resolve_device_id(&config, storage.as_ref())?;
    tracing::info!(%device_id, data_dir = %storage.dir().display(), "Device session ready.");

    let cart = CartEngine::new(backend.clone(), storage, device_id);
    let checkout = OrderPlacement::new(backend.clone(), cart.clone(), Arc::new(config.settings()));
    Ok(Self {
      catalog: CatalogReader::new(backend.clone()),
      orders: OrderHistory::new(backend.clone()),
      admin: AdminConsole::new(backend.clone()),
      backend,
      cart,
      checkout,
      config,
    })
  }
}

/// Configured id first, then the one persisted on a previous start, else a new one.
fn resolve_device_id(config: &AppConfig, storage: &dyn KeyValueStorage) -> Result<Uuid> {
  if let Some(device_id) = config.device_id {
    return Ok(device_id);
  }
  if let Some(stored) = storage.get(DEVICE_ID_KEY)? {
    match Uuid::parse_str(stored.trim()) {
      Ok(device_id) => return Ok(device_id),
      Err(e) => tracing::warn!(error = %e, "Stored device id unreadable; issuing a new one."),
    }
  }
  let device_id = Uuid::new_v4();
  storage.set(DEVICE_ID_KEY, &device_id.to_string())?;
  Ok(device_id)
}
