// core/src/models/mod.rs

//! Rows and value types exchanged with the backend.

pub mod address;
pub mod cart_line;
pub mod order;
pub mod order_line;
pub mod owner;
pub mod product;

pub use address::{Address, NewAddress};
pub use cart_line::CartLine;
pub use order::{NewOrder, Order, OrderStatus, OrderUpdate, OrderWithLines, PaymentStatus};
pub use order_line::{NewOrderLine, OrderLine};
pub use owner::Owner;
pub use product::{Banner, Product};
