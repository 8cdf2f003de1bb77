// core/src/cart/mod.rs

//! The cart engine: one cart API for the UI, whichever store is active.
//!
//! While anonymous, every operation resolves against the device-local store.
//! After [`CartEngine::sign_in`] the remote store is active and a background
//! watcher reloads the view whenever the backend reports a change to the
//! user's cart rows, whether this session or another one caused it.
//!
//! Mutations are fire-and-forget for the UI: each one returns the resulting
//! view, and also emits a [`Notice`] so a toast can be shown without awaiting.
//! Failures are logged and reported the same way; none of them panics.

mod notice;
mod reconcile;
mod view;

pub use notice::{Notice, NoticeLevel};
pub use reconcile::ReconcileReport;
pub use view::CartView;

use crate::backend::SharedBackend;
use crate::catalog::CatalogReader;
use crate::error::{StoreError, StoreResult};
use crate::local_store::{KeyValueStorage, LocalCartStore};
use crate::models::{CartLine, Owner};
use crate::pipeline::{ContextData, Pipeline};
use crate::remote_store::RemoteCartStore;
use parking_lot::{Mutex, RwLock};
use reconcile::{reconcile_pipeline, ReconcileCtxData};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use view::ViewSlot;

const NOTICE_CAPACITY: usize = 64;

/// Session-scoped cart context. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct CartEngine {
  inner: Arc<EngineInner>,
}

struct EngineInner {
  device_id: Uuid,
  catalog: CatalogReader,
  local: LocalCartStore,
  remote: RemoteCartStore,
  session: RwLock<Owner>,
  view: ViewSlot,
  notices: broadcast::Sender<Notice>,
  watcher: Mutex<Option<JoinHandle<()>>>,
  // Serializes auth transitions with each other and with mutations, so a
  // sign-in event reconciles exactly once and never races a local write.
  transition: tokio::sync::Mutex<()>,
  reconcile: Pipeline<ReconcileCtxData, StoreError>,
}

impl CartEngine {
  pub fn new(backend: SharedBackend, storage: Arc<dyn KeyValueStorage>, device_id: Uuid) -> Self {
    let local = LocalCartStore::new(storage);
    let owner = Owner::Anonymous { device_id };
    let initial = CartView::new(owner, local.get());
    let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

    Self {
      inner: Arc::new(EngineInner {
        device_id,
        catalog: CatalogReader::new(backend.clone()),
        local,
        remote: RemoteCartStore::new(backend),
        session: RwLock::new(owner),
        view: ViewSlot::new(initial),
        notices,
        watcher: Mutex::new(None),
        transition: tokio::sync::Mutex::new(()),
        reconcile: reconcile_pipeline(),
      }),
    }
  }

  pub fn device_id(&self) -> Uuid {
    self.inner.device_id
  }

  pub fn owner(&self) -> Owner {
    self.inner.owner()
  }

  /// The last published view.
  pub fn view(&self) -> CartView {
    self.inner.view.current()
  }

  /// Receives every newly published view.
  pub fn watch(&self) -> watch::Receiver<CartView> {
    self.inner.view.subscribe()
  }

  pub fn notices(&self) -> broadcast::Receiver<Notice> {
    self.inner.notices.subscribe()
  }

  pub(crate) fn notify(&self, notice: Notice) {
    self.inner.notify(notice);
  }

  /// Reloads the active store into the view. A failed remote read shows an empty cart.
  pub async fn refresh(&self) -> CartView {
    self.inner.reload().await;
    self.view()
  }

  /// A fresh read of the active store that reports failures instead of
  /// falling back. Checkout snapshots from this, never from a possibly stale view.
  pub async fn current_lines(&self) -> StoreResult<Vec<CartLine>> {
    match self.owner() {
      Owner::Anonymous { .. } => Ok(self.inner.local.get()),
      Owner::User { user_id } => self.inner.remote.load(user_id).await,
    }
  }

  // --- Auth transitions ---

  /// Switches to the user's remote cart, first merging the local cart into it.
  ///
  /// Signing in again as the already active user does nothing. Merge failures
  /// do not fail the sign-in; they show up in the report as dropped lines.
  #[instrument(name = "cart::sign_in", skip(self), fields(device_id = %self.inner.device_id))]
  pub async fn sign_in(&self, user_id: Uuid) -> StoreResult<ReconcileReport> {
    let _transition = self.inner.transition.lock().await;
    if self.owner() == (Owner::User { user_id }) {
      debug!("Already signed in; nothing to reconcile.");
      return Ok(ReconcileReport::default());
    }
    if self.owner().is_authenticated() {
      self.inner.stop_watcher();
    }

    let ctx_data = ContextData::new(ReconcileCtxData::new(
      self.inner.local.clone(),
      self.inner.remote.clone(),
      user_id,
    ));
    if let Err(e) = self.inner.reconcile.run(ctx_data.clone()).await {
      error!(error = %e, "Reconciliation aborted.");
      self.inner.notify(Notice::from_error("Sign in", &e));
      return Err(e);
    }
    let report = ctx_data.into_inner().report;

    *self.inner.session.write() = Owner::User { user_id };
    self.inner.start_watcher(user_id);
    self.inner.reload().await;

    info!(merged = report.merged.len(), dropped = report.dropped.len(), "Signed in.");
    if !report.dropped.is_empty() {
      self.inner.notify(Notice::info(format!(
        "{} item(s) from this device could not be added to your cart",
        report.dropped.len()
      )));
    }
    Ok(report)
  }

  /// Back to the device-local cart. The user's remote cart stays as it is.
  #[instrument(name = "cart::sign_out", skip(self))]
  pub async fn sign_out(&self) {
    let _transition = self.inner.transition.lock().await;
    self.inner.stop_watcher();
    let owner = Owner::Anonymous {
      device_id: self.inner.device_id,
    };
    *self.inner.session.write() = owner;
    self.inner.publish_local(self.inner.local.get());
    info!("Signed out; local cart active.");
  }

  // --- Mutations ---

  /// Adds `qty` of a product, incrementing an existing line. Both stores use
  /// increment semantics.
  #[instrument(name = "cart::add_to_cart", skip(self))]
  pub async fn add_to_cart(&self, product_id: Uuid, qty: i32) -> StoreResult<CartView> {
    let _transition = self.inner.transition.lock().await;
    let result = self.inner.add_to_cart(product_id, qty).await;
    self.inner.settle("Add to cart", result)
  }

  /// Sets the quantity exactly. `qty <= 0` removes the line.
  #[instrument(name = "cart::update_quantity", skip(self))]
  pub async fn update_quantity(&self, product_id: Uuid, qty: i32) -> StoreResult<CartView> {
    let _transition = self.inner.transition.lock().await;
    if qty <= 0 {
      let result = self.inner.remove_from_cart(product_id).await;
      return self.inner.settle("Remove from cart", result);
    }
    let result = self.inner.update_quantity(product_id, qty).await;
    self.inner.settle("Update quantity", result)
  }

  /// Removing a product that is not in the cart is a no-op.
  #[instrument(name = "cart::remove_from_cart", skip(self))]
  pub async fn remove_from_cart(&self, product_id: Uuid) -> StoreResult<CartView> {
    let _transition = self.inner.transition.lock().await;
    let result = self.inner.remove_from_cart(product_id).await;
    self.inner.settle("Remove from cart", result)
  }

  #[instrument(name = "cart::clear_cart", skip(self))]
  pub async fn clear_cart(&self) -> StoreResult<CartView> {
    let _transition = self.inner.transition.lock().await;
    let result = self.inner.clear_cart().await;
    self.inner.settle("Clear cart", result)
  }
}

impl EngineInner {
  fn owner(&self) -> Owner {
    *self.session.read()
  }

  fn notify(&self, notice: Notice) {
    // Nobody listening is fine.
    let _ = self.notices.send(notice);
  }

  /// The mutation boundary: log, emit a notice, hand back the current view or the error.
  fn settle(&self, action: &str, result: StoreResult<String>) -> StoreResult<CartView> {
    match result {
      Ok(message) => {
        debug!(action, "Cart mutation applied.");
        self.notify(Notice::info(message));
        Ok(self.view.current())
      }
      Err(e) => {
        warn!(action, error = %e, owner = %self.owner(), "Cart mutation failed.");
        self.notify(Notice::from_error(action, &e));
        Err(e)
      }
    }
  }

  /// Publishes a view if it still belongs to the active owner.
  fn publish(&self, ticket: u64, view: CartView) {
    let session = self.session.read();
    if *session != view.owner {
      debug!(stale_owner = %view.owner, "Cart load for a previous owner dropped.");
      return;
    }
    self.view.apply(ticket, view);
  }

  fn publish_local(&self, lines: Vec<CartLine>) {
    let ticket = self.view.ticket();
    let owner = Owner::Anonymous { device_id: self.device_id };
    self.publish(ticket, CartView::new(owner, lines));
  }

  async fn reload(&self) {
    let owner = self.owner();
    let ticket = self.view.ticket();
    let lines = match owner {
      Owner::Anonymous { .. } => self.local.get(),
      Owner::User { user_id } => match self.remote.load(user_id).await {
        Ok(lines) => lines,
        Err(e) => {
          warn!(error = %e, %user_id, "Cart reload failed; showing an empty cart.");
          Vec::new()
        }
      },
    };
    self.publish(ticket, CartView::new(owner, lines));
  }

  fn start_watcher(self: &Arc<Self>, user_id: Uuid) {
    let mut subscription = self.remote.subscribe(user_id);
    let weak: Weak<EngineInner> = Arc::downgrade(self);
    let handle = tokio::spawn(async move {
      while let Some(event) = subscription.next().await {
        let Some(inner) = weak.upgrade() else { break };
        if inner.owner() != (Owner::User { user_id }) {
          break;
        }
        debug!(%user_id, kind = ?event.kind, "Cart change pushed; reloading.");
        inner.reload().await;
      }
      debug!(%user_id, "Cart watcher finished.");
    });
    if let Some(previous) = self.watcher.lock().replace(handle) {
      previous.abort();
    }
  }

  fn stop_watcher(&self) {
    if let Some(handle) = self.watcher.lock().take() {
      handle.abort();
    }
  }

  async fn add_to_cart(&self, product_id: Uuid, qty: i32) -> StoreResult<String> {
    if qty <= 0 {
      return Err(StoreError::Validation(format!("Quantity must be positive, got {}", qty)));
    }
    let product = self.catalog.product(product_id).await?;
    if !product.in_stock {
      return Err(StoreError::Validation(format!("{} is out of stock", product.title)));
    }

    match self.owner() {
      Owner::Anonymous { .. } => {
        let lines = self.local.add(CartLine::from_product(&product, qty), qty)?;
        self.publish_local(lines);
      }
      Owner::User { user_id } => {
        self.remote.merge(user_id, product_id, qty).await?;
        self.reload().await;
      }
    }
    Ok(format!("Added {} to cart", product.title))
  }

  async fn update_quantity(&self, product_id: Uuid, qty: i32) -> StoreResult<String> {
    match self.owner() {
      Owner::Anonymous { .. } => {
        let lines = self.local.set_qty(product_id, qty);
        self.publish_local(lines);
      }
      Owner::User { user_id } => {
        self.remote.set_quantity(user_id, product_id, qty).await?;
        self.reload().await;
      }
    }
    Ok("Cart updated".to_string())
  }

  async fn remove_from_cart(&self, product_id: Uuid) -> StoreResult<String> {
    match self.owner() {
      Owner::Anonymous { .. } => {
        let lines = self.local.remove(product_id);
        self.publish_local(lines);
      }
      Owner::User { user_id } => {
        self.remote.delete(user_id, product_id).await?;
        self.reload().await;
      }
    }
    Ok("Removed from cart".to_string())
  }

  async fn clear_cart(&self) -> StoreResult<String> {
    match self.owner() {
      Owner::Anonymous { .. } => {
        self.local.clear();
        self.publish_local(Vec::new());
      }
      Owner::User { user_id } => {
        self.remote.delete_all(user_id).await?;
        self.reload().await;
      }
    }
    Ok("Cart cleared".to_string())
  }
}

impl Drop for EngineInner {
  fn drop(&mut self) {
    if let Some(handle) = self.watcher.get_mut().take() {
      handle.abort();
    }
  }
}
