// core/src/cart/reconcile.rs

//! Sign-in reconciliation: the one-time additive merge of the device-local
//! cart into the user's remote cart.
//!
//! The local cart is consumed at most once. It is cleared after the merge
//! step no matter how many lines made it across; lines that failed to merge
//! are reported as dropped, never replayed on a later sign-in.

use crate::error::StoreError;
use crate::local_store::LocalCartStore;
use crate::models::CartLine;
use crate::pipeline::{ContextData, Pipeline, PipelineControl};
use crate::remote_store::RemoteCartStore;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
  /// Products whose local quantity was added to the remote cart.
  pub merged: Vec<Uuid>,
  /// Products whose merge failed; their local quantity is gone.
  pub dropped: Vec<Uuid>,
}

#[derive(Clone)]
pub(crate) struct ReconcileCtxData {
  pub local: LocalCartStore,
  pub remote: RemoteCartStore,
  pub user_id: Uuid,
  pub pending: Vec<CartLine>,
  pub report: ReconcileReport,
}

impl ReconcileCtxData {
  pub(crate) fn new(local: LocalCartStore, remote: RemoteCartStore, user_id: Uuid) -> Self {
    Self {
      local,
      remote,
      user_id,
      pending: Vec::new(),
      report: ReconcileReport::default(),
    }
  }
}

pub(crate) fn reconcile_pipeline() -> Pipeline<ReconcileCtxData, StoreError> {
  let mut p = Pipeline::<ReconcileCtxData, StoreError>::new(&[
    ("read_local_cart", false),
    ("merge_into_remote", false),
    ("consume_local_cart", false),
  ]);

  p.on_root("read_local_cart", |ctx_data: ContextData<ReconcileCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let pending = guard.local.get();
      guard.pending = pending;
      if guard.pending.is_empty() {
        info!(user_id = %guard.user_id, "No local cart to reconcile.");
        return Ok::<_, StoreError>(PipelineControl::Stop);
      }
      info!(user_id = %guard.user_id, lines = guard.pending.len(), "Reconciling local cart.");
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("merge_into_remote", |ctx_data: ContextData<ReconcileCtxData>| {
    Box::pin(async move {
      let (remote, user_id, pending) = {
        let guard = ctx_data.read();
        (guard.remote.clone(), guard.user_id, guard.pending.clone())
      };

      let mut merged = Vec::with_capacity(pending.len());
      let mut dropped = Vec::new();
      for line in &pending {
        match remote.merge(user_id, line.product_id, line.qty).await {
          Ok(()) => merged.push(line.product_id),
          Err(e) => {
            warn!(
              %user_id,
              product_id = %line.product_id,
              qty = line.qty,
              error = %e,
              "Local cart line could not be merged; dropping it."
            );
            dropped.push(line.product_id);
          }
        }
      }

      let mut guard = ctx_data.write();
      guard.report.merged = merged;
      guard.report.dropped = dropped;
      Ok::<_, StoreError>(PipelineControl::Continue)
    })
  });

  p.on_root("consume_local_cart", |ctx_data: ContextData<ReconcileCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      guard.local.clear();
      info!(
        user_id = %guard.user_id,
        merged = guard.report.merged.len(),
        dropped = guard.report.dropped.len(),
        "Local cart consumed."
      );
      Ok::<_, StoreError>(PipelineControl::Continue)
    })
  });

  p
}
