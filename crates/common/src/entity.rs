//! Entities persisted by the data-access layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{InventoryItemId, Money, OrderId, OrderItemId, OrderItemStatus, ProductId};

/// A record owned by a persistence store.
pub trait Entity: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// The identifier type of this entity.
    type Id: Copy
        + Eq
        + std::hash::Hash
        + std::fmt::Display
        + std::fmt::Debug
        + From<i64>
        + Into<i64>
        + Send
        + Sync
        + 'static;

    /// Entity name used in errors and log fields.
    fn entity_type() -> &'static str;

    fn id(&self) -> Self::Id;

    fn set_id(&mut self, id: Self::Id);

    /// Returns true if writing `self` over `stored` would undo a change made
    /// after `self` was read. Stores refuse such writes.
    fn is_stale_against(&self, _stored: &Self) -> bool {
        false
    }
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Decimal,
    /// Unit price agreed when the item was placed.
    pub price: Money,
    pub status: OrderItemStatus,
    pub submitted_on: Option<DateTime<Utc>>,
    pub shipped_on: Option<DateTime<Utc>>,
    pub back_ordered_on: Option<DateTime<Utc>>,
}

impl OrderItem {
    /// Creates a pending order item without an assigned id.
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        quantity: impl Into<Decimal>,
        price: Money,
    ) -> Self {
        Self {
            order_id,
            product_id,
            quantity: quantity.into(),
            price,
            ..Self::default()
        }
    }

    /// Sets the id, for fixtures seeded straight into a store.
    pub fn with_id(mut self, id: OrderItemId) -> Self {
        self.id = id;
        self
    }

    /// Sets the status, for fixtures seeded straight into a store.
    pub fn with_status(mut self, status: OrderItemStatus) -> Self {
        self.status = status;
        self
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn entity_type() -> &'static str {
        "OrderItem"
    }

    fn id(&self) -> OrderItemId {
        self.id
    }

    fn set_id(&mut self, id: OrderItemId) {
        self.id = id;
    }

    /// Status only moves through transitions, so a differing stored status
    /// means one landed in between.
    fn is_stale_against(&self, stored: &Self) -> bool {
        self.status != stored.status
    }
}

/// Stock on hand for one product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub product_id: ProductId,
    pub quantity_on_hand: Decimal,
}

impl InventoryItem {
    pub fn new(product_id: ProductId, quantity_on_hand: impl Into<Decimal>) -> Self {
        Self {
            id: InventoryItemId::default(),
            product_id,
            quantity_on_hand: quantity_on_hand.into(),
        }
    }

    pub fn with_id(mut self, id: InventoryItemId) -> Self {
        self.id = id;
        self
    }
}

impl Entity for InventoryItem {
    type Id = InventoryItemId;

    fn entity_type() -> &'static str {
        "InventoryItem"
    }

    fn id(&self) -> InventoryItemId {
        self.id
    }

    fn set_id(&mut self, id: InventoryItemId) {
        self.id = id;
    }
}

/// Catalog product, read-only to the order service layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub current_price: Money,
    /// Largest quantity a single order item may request.
    pub available_amount: Decimal,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        current_price: Money,
        available_amount: impl Into<Decimal>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            current_price,
            available_amount: available_amount.into(),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn entity_type() -> &'static str {
        "Product"
    }

    fn id(&self) -> ProductId {
        self.id
    }

    fn set_id(&mut self, id: ProductId) {
        self.id = id;
    }
}
