use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Entity, InventoryItem, OrderId, OrderItem, OrderItemId, Product, ProductId};
use rust_decimal::Decimal;

use crate::Result;

/// CRUD contract for one entity type.
///
/// Implementations must be thread-safe. Every call reads or writes the
/// backing store directly; callers never receive shared references into it.
#[async_trait]
pub trait DataProxy<E: Entity>: Send + Sync {
    /// Fetches an entity by id, failing with `NotFound` if it doesn't exist.
    async fn get_by_id(&self, id: E::Id) -> Result<E>;

    /// Returns every stored entity.
    async fn get_all(&self) -> Result<Vec<E>>;

    /// Stores a new entity, assigning its id, and returns the stored copy.
    async fn insert(&self, entity: E) -> Result<E>;

    /// Replaces an existing entity and returns the stored copy.
    async fn update(&self, entity: E) -> Result<E>;

    /// Removes an entity by id.
    async fn delete(&self, id: E::Id) -> Result<()>;
}

/// Order item reads and status transitions.
///
/// Transitions are applied as a single compare-and-write: the stored status
/// must be able to move to the target status, otherwise `InvalidTransition`
/// is returned and nothing changes.
#[async_trait]
pub trait OrderItemDataProxy: DataProxy<OrderItem> {
    /// Returns all items of an order.
    async fn get_by_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    /// Marks an item as submitted.
    async fn submit(&self, id: OrderItemId, submitted_on: DateTime<Utc>) -> Result<OrderItem>;

    /// Marks an item as shipped.
    async fn ship(&self, id: OrderItemId, shipped_on: DateTime<Utc>) -> Result<OrderItem>;

    /// Marks an item as back-ordered.
    async fn back_order(&self, id: OrderItemId, back_ordered_on: DateTime<Utc>)
    -> Result<OrderItem>;
}

/// Inventory reads and the atomic stock decrement.
#[async_trait]
pub trait InventoryItemDataProxy: DataProxy<InventoryItem> {
    /// Fetches the inventory row of a product.
    async fn get_by_product(&self, product_id: ProductId) -> Result<InventoryItem>;

    /// Subtracts `quantity` from the product's quantity on hand.
    ///
    /// Either the whole decrement is applied, or the call fails with
    /// `InsufficientStock` and the row is left untouched.
    async fn decrement_quantity_on_hand(
        &self,
        product_id: ProductId,
        quantity: Decimal,
    ) -> Result<InventoryItem>;
}

/// Product lookups. Products are never written by the service layer.
pub trait ProductDataProxy: DataProxy<Product> {}
