// core/src/local_store.rs

//! Device-local cart for anonymous sessions.
//!
//! The cart is one JSON document (an array of [`CartLine`]) under a fixed key.
//! Reads and writes fail soft: a missing, unreadable or corrupt document is an
//! empty cart, and a failed write is logged and dropped.

use crate::error::{StoreError, StoreResult};
use crate::models::CartLine;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Namespace key of the persisted cart document.
pub const LOCAL_CART_KEY: &str = "storefront.cart.v1";

/// Minimal durable key-value storage, the way a device exposes it.
pub trait KeyValueStorage: Send + Sync {
  fn get(&self, key: &str) -> StoreResult<Option<String>>;
  fn set(&self, key: &str, value: &str) -> StoreResult<()>;
  fn remove(&self, key: &str) -> StoreResult<()>;
}

/// One file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
  dir: PathBuf,
}

impl FileStorage {
  pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir).map_err(|e| StoreError::Storage(format!("create {}: {}", dir.display(), e)))?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path_for(&self, key: &str) -> PathBuf {
    let file_name: String = key
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
      .collect();
    self.dir.join(format!("{}.json", file_name))
  }
}

impl KeyValueStorage for FileStorage {
  fn get(&self, key: &str) -> StoreResult<Option<String>> {
    match fs::read_to_string(self.path_for(key)) {
      Ok(contents) => Ok(Some(contents)),
      Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
      Err(e) => Err(StoreError::Storage(format!("read {}: {}", key, e))),
    }
  }

  fn set(&self, key: &str, value: &str) -> StoreResult<()> {
    let path = self.path_for(key);
    // Readers only ever see a complete document.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, value).map_err(|e| StoreError::Storage(format!("write {}: {}", key, e)))?;
    fs::rename(&tmp, &path).map_err(|e| StoreError::Storage(format!("rename {}: {}", key, e)))
  }

  fn remove(&self, key: &str) -> StoreResult<()> {
    match fs::remove_file(self.path_for(key)) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
      Err(e) => Err(StoreError::Storage(format!("remove {}: {}", key, e))),
    }
  }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStorage for MemoryStorage {
  fn get(&self, key: &str) -> StoreResult<Option<String>> {
    Ok(self.entries.lock().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> StoreResult<()> {
    self.entries.lock().insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> StoreResult<()> {
    self.entries.lock().remove(key);
    Ok(())
  }
}

#[derive(Clone)]
pub struct LocalCartStore {
  storage: Arc<dyn KeyValueStorage>,
}

impl LocalCartStore {
  pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
    Self { storage }
  }

  pub fn get(&self) -> Vec<CartLine> {
    let raw = match self.storage.get(LOCAL_CART_KEY) {
      Ok(Some(raw)) => raw,
      Ok(None) => return Vec::new(),
      Err(e) => {
        warn!(error = %e, "Local cart unreadable, treating as empty.");
        return Vec::new();
      }
    };
    match serde_json::from_str::<Vec<CartLine>>(&raw) {
      Ok(lines) => lines,
      Err(e) => {
        warn!(error = %e, "Local cart corrupt, treating as empty.");
        Vec::new()
      }
    }
  }

  pub fn put(&self, lines: &[CartLine]) {
    let result = serde_json::to_string(lines)
      .map_err(StoreError::from)
      .and_then(|json| self.storage.set(LOCAL_CART_KEY, &json));
    if let Err(e) = result {
      warn!(error = %e, lines = lines.len(), "Failed to persist local cart.");
    }
  }

  pub fn clear(&self) {
    if let Err(e) = self.storage.remove(LOCAL_CART_KEY) {
      warn!(error = %e, "Failed to clear local cart.");
    }
  }

  /// Adds `qty` of `line`'s product, incrementing an existing line instead of
  /// adding a second one. A sum past `i32::MAX` is rejected and nothing is written.
  pub fn add(&self, line: CartLine, qty: i32) -> StoreResult<Vec<CartLine>> {
    let mut lines = self.get();
    match lines.iter_mut().find(|l| l.product_id == line.product_id) {
      Some(existing) => {
        let Some(total) = existing.qty.checked_add(qty) else {
          return Err(StoreError::Validation(format!(
            "Quantity of {} would exceed {}",
            existing.title,
            i32::MAX
          )));
        };
        existing.qty = total;
      }
      None => lines.push(CartLine { qty, ..line }),
    }
    self.put(&lines);
    Ok(lines)
  }

  /// Sets the quantity exactly; `qty <= 0` removes the line.
  pub fn set_qty(&self, product_id: Uuid, qty: i32) -> Vec<CartLine> {
    if qty <= 0 {
      return self.remove(product_id);
    }
    let mut lines = self.get();
    if let Some(existing) = lines.iter_mut().find(|l| l.product_id == product_id) {
      existing.qty = qty;
      self.put(&lines);
    }
    lines
  }

  /// Removing an absent product leaves storage untouched.
  pub fn remove(&self, product_id: Uuid) -> Vec<CartLine> {
    let mut lines = self.get();
    let before = lines.len();
    lines.retain(|l| l.product_id != product_id);
    if lines.len() != before {
      self.put(&lines);
    }
    lines
  }
}
