// app/src/db/listener.rs

//! Bridges Postgres `LISTEN storefront_changes` into the in-process [`ChangeHub`].
//!
//! The notify trigger sends `{"table": ..., "op": ..., "user_id": ...}`. When
//! the listening connection drops, notifications are lost; after reconnecting
//! the bridge publishes one owner-less `Update` per table so every view reloads.

use serde::Deserialize;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use std::time::Duration;
use storefront::{ChangeEvent, ChangeHub, ChangeKind, Table};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const CHANGE_CHANNEL: &str = "storefront_changes";

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

const RESYNC_TABLES: [Table; 4] = [Table::Products, Table::Banners, Table::CartItems, Table::Orders];

#[derive(Debug, Deserialize)]
struct ChangePayload {
  table: String,
  op: String,
  user_id: Option<Uuid>,
}

/// Decodes one notification payload. Unknown tables and operations are ignored.
fn decode(payload: &str) -> Option<ChangeEvent> {
  let parsed: ChangePayload = match serde_json::from_str(payload) {
    Ok(parsed) => parsed,
    Err(e) => {
      warn!(error = %e, payload, "Malformed change notification.");
      return None;
    }
  };
  let table = Table::from_name(&parsed.table)?;
  let kind = match parsed.op.as_str() {
    "insert" => ChangeKind::Insert,
    "update" => ChangeKind::Update,
    "delete" => ChangeKind::Delete,
    _ => return None,
  };
  Some(ChangeEvent {
    table,
    kind,
    user_id: parsed.user_id,
  })
}

fn publish_resync(hub: &ChangeHub) {
  for table in RESYNC_TABLES {
    hub.publish(ChangeEvent {
      table,
      kind: ChangeKind::Update,
      user_id: None,
    });
  }
}

/// Runs until the process exits, reconnecting as needed.
pub fn spawn_change_listener(pool: PgPool, hub: ChangeHub) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut first_connect = true;
    loop {
      let mut listener = match PgListener::connect_with(&pool).await {
        Ok(listener) => listener,
        Err(e) => {
          error!(error = %e, "Change listener could not connect; retrying.");
          tokio::time::sleep(RECONNECT_DELAY).await;
          continue;
        }
      };
      if let Err(e) = listener.listen(CHANGE_CHANNEL).await {
        error!(error = %e, "LISTEN failed; retrying.");
        tokio::time::sleep(RECONNECT_DELAY).await;
        continue;
      }
      info!(channel = CHANGE_CHANNEL, "Listening for row changes.");
      if !first_connect {
        publish_resync(&hub);
      }
      first_connect = false;

      loop {
        match listener.try_recv().await {
          Ok(Some(notification)) => {
            if let Some(event) = decode(notification.payload()) {
              debug!(table = event.table.as_str(), kind = ?event.kind, "Row change received.");
              hub.publish(event);
            }
          }
          Ok(None) => {
            // The listener reconnects on the next call; anything sent meanwhile is gone.
            warn!("Change listener connection lost; resyncing.");
            publish_resync(&hub);
          }
          Err(e) => {
            error!(error = %e, "Change listener failed; reconnecting.");
            tokio::time::sleep(RECONNECT_DELAY).await;
            break;
          }
        }
      }
    }
  })
}
