// app/src/models/mod.rs

//! Row shapes as Postgres returns them. Each converts into the matching
//! `storefront` model; status columns are TEXT and parsed on the way.

pub mod address;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;

pub use address::AddressRow;
pub use cart_item::CartItemWithProduct;
pub use order::OrderRow;
pub use order_item::OrderItemRow;
pub use product::{BannerRow, ProductRow};
