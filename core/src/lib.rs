// core/src/lib.rs

//! Storefront core: the cart and order logic of a small shop whose data lives
//! in a hosted Postgres service.
//!
//! The crate is the client-side half of the system:
//!  - A catalog reader with hardcoded fallbacks.
//!  - A device-local cart for anonymous sessions and a per-user remote cart.
//!  - A cart engine that reconciles the two on sign-in and keeps one live view.
//!  - An order placement workflow that snapshots the cart into an immutable order.
//!  - Read models for order history and a small admin console.
//!
//! Everything that talks to the hosted service goes through the traits in
//! [`backend`]; [`backend::memory::InMemoryBackend`] implements them in-process.

pub mod admin;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod local_store;
pub mod models;
pub mod order_code;
pub mod orders;
pub mod pipeline;
pub mod realtime;
pub mod remote_store;
pub mod settings;

// --- Re-exports for the Public API ---

pub use crate::admin::{AdminConsole, DashboardSummary};
pub use crate::backend::{Backend, SharedBackend};
pub use crate::cart::{CartEngine, CartView, Notice, NoticeLevel, ReconcileReport};
pub use crate::catalog::CatalogReader;
pub use crate::checkout::OrderPlacement;
pub use crate::error::{ErrorKind, StoreError, StoreResult};
pub use crate::local_store::{FileStorage, KeyValueStorage, LocalCartStore, MemoryStorage};
pub use crate::models::{
  Address, Banner, CartLine, NewAddress, Order, OrderLine, OrderStatus, OrderWithLines, Owner, PaymentStatus, Product,
};
pub use crate::orders::{OrderFeed, OrderHistory};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult};
pub use crate::realtime::{ChangeEvent, ChangeHub, ChangeKind, ChangeSubscription, Table};
pub use crate::remote_store::RemoteCartStore;
pub use crate::settings::StorefrontSettings;
