use common::{OrderItemId, OrderItemStatus, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when interacting with a data proxy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No entity with the given id exists.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The product has no inventory row.
    #[error("No inventory for product {0}")]
    NoInventoryForProduct(ProductId),

    /// A decrement asked for more than the quantity on hand.
    /// Nothing was written.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, on hand {on_hand}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: Decimal,
        on_hand: Decimal,
    },

    /// A status change would move an order item backward or out of a terminal status.
    #[error("Invalid status transition for order item {order_item_id}: {from} -> {to}")]
    InvalidTransition {
        order_item_id: OrderItemId,
        from: OrderItemStatus,
        to: OrderItemStatus,
    },

    /// The stored row changed after the entity being written was read.
    /// Nothing was written.
    #[error("Stale write to {entity} {id}: the stored row has changed")]
    StaleWrite { entity: &'static str, id: i64 },

    /// A quantity argument was zero or negative.
    #[error("Invalid quantity: {0} (must be greater than 0)")]
    InvalidQuantity(Decimal),

    /// The backing store could not serve the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found<E: common::Entity>(id: E::Id) -> Self {
        StoreError::NotFound {
            entity: E::entity_type(),
            id: id.into(),
        }
    }

    pub fn stale_write<E: common::Entity>(id: E::Id) -> Self {
        StoreError::StaleWrite {
            entity: E::entity_type(),
            id: id.into(),
        }
    }
}

/// Result type for data proxy operations.
pub type Result<T> = std::result::Result<T, StoreError>;
