//! Shared types for the order service layer.
//!
//! Identifiers, the `Money` value object, the order item lifecycle and the
//! entities the persistence layer stores.

mod entity;
mod money;
mod status;
mod types;

pub use entity::{Entity, InventoryItem, OrderItem, Product};
pub use money::Money;
pub use status::OrderItemStatus;
pub use types::{InventoryItemId, OrderId, OrderItemId, ProductId};
