//! Inventory items and the stock decrement consumed by shipping.

mod rules;
mod service;

pub use rules::{DecrementQuantityValidityRule, QuantityOnHandValidityRule};
pub use service::InventoryItemService;
