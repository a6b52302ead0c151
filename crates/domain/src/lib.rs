//! Service layer for order items and inventory.
//!
//! This crate provides:
//! - `Command`, a deferred unit of work guarded by rules
//! - `Rule` and the fail-fast `RuleEngine`
//! - `ServiceBase`, the insert/update lifecycle shared by entity services
//! - `OrderItemService`, whose ship command back-orders on insufficient stock
//! - `InventoryItemService`, which owns the stock decrement

pub mod command;
pub mod config;
pub mod error;
pub mod inventory;
pub mod order_item;
pub mod rule;
pub mod service;

pub use command::Command;
pub use config::{ExecutionMode, ServiceConfig, UnknownExecutionMode};
pub use error::ServiceError;
pub use inventory::{
    DecrementQuantityValidityRule, InventoryItemService, QuantityOnHandValidityRule,
};
pub use order_item::{
    CanSubmitOrderItemRule, OrderItemAmountValidityRule, OrderItemPriceValidityRule,
    OrderItemService, ValidOrderItemStateRule,
};
pub use rule::{Rule, RuleEngine, RuleSet, RuleViolation};
pub use service::ServiceBase;
