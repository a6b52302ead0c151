//! Persistence contracts consumed by the service layer.
//!
//! Each entity type is reached through a [`DataProxy`] (get, insert, update,
//! delete) plus an entity-specific extension trait. [`InMemoryStore`]
//! implements all of them for tests and benchmarks.

pub mod error;
pub mod memory;
pub mod proxy;

pub use error::{Result, StoreError};
pub use memory::{
    InMemoryInventoryItemStore, InMemoryOrderItemStore, InMemoryProductStore, InMemoryStore,
};
pub use proxy::{DataProxy, InventoryItemDataProxy, OrderItemDataProxy, ProductDataProxy};
