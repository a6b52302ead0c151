use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    Entity, InventoryItem, OrderId, OrderItem, OrderItemId, OrderItemStatus, Product, ProductId,
};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::{
    DataProxy, InventoryItemDataProxy, OrderItemDataProxy, ProductDataProxy, Result, StoreError,
};

/// In-memory order item store.
pub type InMemoryOrderItemStore = InMemoryStore<OrderItem>;

/// In-memory inventory store.
pub type InMemoryInventoryItemStore = InMemoryStore<InventoryItem>;

/// In-memory product catalog.
pub type InMemoryProductStore = InMemoryStore<Product>;

#[derive(Debug)]
struct Table<E: Entity> {
    rows: HashMap<E::Id, E>,
    next_id: i64,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            next_id: 0,
        }
    }
}

#[derive(Debug, Default)]
struct Probe {
    reads: AtomicUsize,
    writes: AtomicUsize,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

/// In-memory data proxy for testing.
///
/// Clones share the same table, so a store handed to a service can still be
/// inspected by the test that created it. Every read and write call is
/// counted, and the store can be switched to fail or to delay each call.
#[derive(Debug, Clone)]
pub struct InMemoryStore<E: Entity> {
    table: Arc<RwLock<Table<E>>>,
    probe: Arc<Probe>,
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self {
            table: Arc::default(),
            probe: Arc::default(),
        }
    }
}

impl<E: Entity> InMemoryStore<E> {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entity with the id it already carries.
    ///
    /// Seeding is not counted as a write.
    pub async fn seed(&self, entity: E) {
        let mut table = self.table.write().await;
        let id: i64 = entity.id().into();
        table.next_id = table.next_id.max(id);
        table.rows.insert(entity.id(), entity);
    }

    /// Returns a copy of a stored entity without counting a read.
    pub async fn peek(&self, id: E::Id) -> Option<E> {
        self.table.read().await.rows.get(&id).cloned()
    }

    /// Number of read calls served so far.
    pub fn read_count(&self) -> usize {
        self.probe.reads.load(Ordering::SeqCst)
    }

    /// Number of write calls issued so far, successful or not.
    pub fn write_count(&self) -> usize {
        self.probe.writes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.probe.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every subsequent call before it touches the table.
    pub fn set_latency(&self, latency: Duration) {
        self.probe
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn begin(&self, counter: &AtomicUsize) -> Result<()> {
        let latency_ms = self.probe.latency_ms.load(Ordering::SeqCst);
        if latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        }
        counter.fetch_add(1, Ordering::SeqCst);
        if self.probe.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "{} store is offline",
                E::entity_type()
            )));
        }
        Ok(())
    }

    async fn begin_read(&self) -> Result<()> {
        self.begin(&self.probe.reads).await
    }

    async fn begin_write(&self) -> Result<()> {
        self.begin(&self.probe.writes).await
    }
}

#[async_trait]
impl<E: Entity> DataProxy<E> for InMemoryStore<E> {
    async fn get_by_id(&self, id: E::Id) -> Result<E> {
        self.begin_read().await?;
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<E>(id))
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        self.begin_read().await?;
        let table = self.table.read().await;
        let mut rows: Vec<E> = table.rows.values().cloned().collect();
        rows.sort_by_key(|e| -> i64 { e.id().into() });
        Ok(rows)
    }

    async fn insert(&self, mut entity: E) -> Result<E> {
        self.begin_write().await?;
        let mut table = self.table.write().await;
        table.next_id += 1;
        entity.set_id(E::Id::from(table.next_id));
        table.rows.insert(entity.id(), entity.clone());
        tracing::debug!(entity = E::entity_type(), id = %entity.id(), "inserted");
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E> {
        self.begin_write().await?;
        let mut table = self.table.write().await;
        let row = table
            .rows
            .get_mut(&entity.id())
            .ok_or_else(|| StoreError::not_found::<E>(entity.id()))?;
        if entity.is_stale_against(row) {
            return Err(StoreError::stale_write::<E>(entity.id()));
        }
        *row = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: E::Id) -> Result<()> {
        self.begin_write().await?;
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found::<E>(id))
    }
}

impl InMemoryStore<OrderItem> {
    async fn transition(
        &self,
        id: OrderItemId,
        to: OrderItemStatus,
        stamp: impl FnOnce(&mut OrderItem) + Send,
    ) -> Result<OrderItem> {
        self.begin_write().await?;
        let mut table = self.table.write().await;
        let item = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found::<OrderItem>(id))?;

        if !item.status.can_transition_to(to) {
            return Err(StoreError::InvalidTransition {
                order_item_id: id,
                from: item.status,
                to,
            });
        }

        item.status = to;
        stamp(item);
        Ok(item.clone())
    }
}

#[async_trait]
impl OrderItemDataProxy for InMemoryStore<OrderItem> {
    async fn get_by_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        self.begin_read().await?;
        let table = self.table.read().await;
        let mut items: Vec<OrderItem> = table
            .rows
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn submit(&self, id: OrderItemId, submitted_on: DateTime<Utc>) -> Result<OrderItem> {
        self.transition(id, OrderItemStatus::Submitted, |item| {
            item.submitted_on = Some(submitted_on)
        })
        .await
    }

    async fn ship(&self, id: OrderItemId, shipped_on: DateTime<Utc>) -> Result<OrderItem> {
        self.transition(id, OrderItemStatus::Shipped, |item| {
            item.shipped_on = Some(shipped_on)
        })
        .await
    }

    async fn back_order(
        &self,
        id: OrderItemId,
        back_ordered_on: DateTime<Utc>,
    ) -> Result<OrderItem> {
        self.transition(id, OrderItemStatus::BackOrdered, |item| {
            item.back_ordered_on = Some(back_ordered_on)
        })
        .await
    }
}

#[async_trait]
impl InventoryItemDataProxy for InMemoryStore<InventoryItem> {
    async fn get_by_product(&self, product_id: ProductId) -> Result<InventoryItem> {
        self.begin_read().await?;
        self.table
            .read()
            .await
            .rows
            .values()
            .find(|row| row.product_id == product_id)
            .cloned()
            .ok_or(StoreError::NoInventoryForProduct(product_id))
    }

    async fn decrement_quantity_on_hand(
        &self,
        product_id: ProductId,
        quantity: Decimal,
    ) -> Result<InventoryItem> {
        self.begin_write().await?;
        if quantity <= Decimal::ZERO {
            return Err(StoreError::InvalidQuantity(quantity));
        }

        // Check and subtract under one write lock so concurrent decrements
        // can never both pass the check.
        let mut table = self.table.write().await;
        let row = table
            .rows
            .values_mut()
            .find(|row| row.product_id == product_id)
            .ok_or(StoreError::NoInventoryForProduct(product_id))?;

        if quantity > row.quantity_on_hand {
            return Err(StoreError::InsufficientStock {
                product_id,
                requested: quantity,
                on_hand: row.quantity_on_hand,
            });
        }

        row.quantity_on_hand -= quantity;
        tracing::debug!(
            %product_id,
            %quantity,
            remaining = %row.quantity_on_hand,
            "decremented quantity on hand"
        );
        Ok(row.clone())
    }
}

impl ProductDataProxy for InMemoryStore<Product> {}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{InventoryItemId, Money};

    fn order_item(order: i64) -> OrderItem {
        OrderItem::new(
            OrderId::new(order),
            ProductId::new(7),
            3,
            Money::from_cents(1000),
        )
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = InMemoryOrderItemStore::new();

        let first = store.insert(order_item(1)).await.unwrap();
        let second = store.insert(order_item(1)).await.unwrap();

        assert_eq!(first.id, OrderItemId::new(1));
        assert_eq!(second.id, OrderItemId::new(2));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn insert_continues_after_seeded_ids() {
        let store = InMemoryOrderItemStore::new();
        store.seed(order_item(1).with_id(OrderItemId::new(10))).await;

        let inserted = store.insert(order_item(1)).await.unwrap();

        assert_eq!(inserted.id, OrderItemId::new(11));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn get_by_id_missing_is_not_found() {
        let store = InMemoryOrderItemStore::new();

        let err = store.get_by_id(OrderItemId::new(99)).await.unwrap_err();

        assert_eq!(
            err,
            StoreError::NotFound {
                entity: "OrderItem",
                id: 99
            }
        );
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let store = InMemoryOrderItemStore::new();
        let mut item = store.insert(order_item(1)).await.unwrap();

        item.quantity = Decimal::from(5);
        store.update(item.clone()).await.unwrap();
        assert_eq!(store.peek(item.id).await.unwrap().quantity, Decimal::from(5));

        store.delete(item.id).await.unwrap();
        assert!(store.peek(item.id).await.is_none());
        assert!(store.delete(item.id).await.is_err());
    }

    #[tokio::test]
    async fn update_refuses_to_overwrite_a_status_change() {
        let store = InMemoryOrderItemStore::new();
        let read = store.insert(order_item(1)).await.unwrap();
        store.submit(read.id, Utc::now()).await.unwrap();

        let mut changed = read.clone();
        changed.quantity = Decimal::from(5);
        let err = store.update(changed).await.unwrap_err();

        assert_eq!(
            err,
            StoreError::StaleWrite {
                entity: "OrderItem",
                id: 1
            }
        );
        let stored = store.peek(read.id).await.unwrap();
        assert_eq!(stored.status, OrderItemStatus::Submitted);
        assert_eq!(stored.quantity, Decimal::from(3));
    }

    #[tokio::test]
    async fn get_all_returns_rows_in_id_order() {
        let store = InMemoryOrderItemStore::new();
        store.seed(order_item(1).with_id(OrderItemId::new(5))).await;
        store.seed(order_item(2).with_id(OrderItemId::new(2))).await;

        let ids: Vec<_> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();

        assert_eq!(ids, vec![OrderItemId::new(2), OrderItemId::new(5)]);
    }

    #[tokio::test]
    async fn get_by_order_filters_and_sorts() {
        let store = InMemoryOrderItemStore::new();
        store.insert(order_item(1)).await.unwrap();
        store.insert(order_item(2)).await.unwrap();
        store.insert(order_item(1)).await.unwrap();

        let items = store.get_by_order(OrderId::new(1)).await.unwrap();

        let ids: Vec<i64> = items.iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn transitions_stamp_timestamps() {
        let store = InMemoryOrderItemStore::new();
        let item = store.insert(order_item(1)).await.unwrap();
        let now = Utc::now();

        let submitted = store.submit(item.id, now).await.unwrap();
        assert_eq!(submitted.status, OrderItemStatus::Submitted);
        assert_eq!(submitted.submitted_on, Some(now));

        let shipped = store.ship(item.id, now).await.unwrap();
        assert_eq!(shipped.status, OrderItemStatus::Shipped);
        assert_eq!(shipped.shipped_on, Some(now));
    }

    #[tokio::test]
    async fn transitions_never_move_backward() {
        let store = InMemoryOrderItemStore::new();
        store
            .seed(
                order_item(1)
                    .with_id(OrderItemId::new(1))
                    .with_status(OrderItemStatus::BackOrdered),
            )
            .await;

        let err = store.ship(OrderItemId::new(1), Utc::now()).await.unwrap_err();

        assert!(matches!(
            err,
            StoreError::InvalidTransition {
                from: OrderItemStatus::BackOrdered,
                to: OrderItemStatus::Shipped,
                ..
            }
        ));
        let stored = store.peek(OrderItemId::new(1)).await.unwrap();
        assert_eq!(stored.status, OrderItemStatus::BackOrdered);
        assert!(stored.shipped_on.is_none());
    }

    #[tokio::test]
    async fn decrement_applies_whole_quantity() {
        let store = InMemoryInventoryItemStore::new();
        store
            .seed(InventoryItem::new(ProductId::new(7), 10).with_id(InventoryItemId::new(1)))
            .await;

        let row = store
            .decrement_quantity_on_hand(ProductId::new(7), Decimal::from(3))
            .await
            .unwrap();

        assert_eq!(row.quantity_on_hand, Decimal::from(7));
    }

    #[tokio::test]
    async fn decrement_beyond_stock_leaves_row_untouched() {
        let store = InMemoryInventoryItemStore::new();
        store
            .seed(InventoryItem::new(ProductId::new(7), 5).with_id(InventoryItemId::new(1)))
            .await;

        let err = store
            .decrement_quantity_on_hand(ProductId::new(7), Decimal::from(20))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::InsufficientStock {
                product_id: ProductId::new(7),
                requested: Decimal::from(20),
                on_hand: Decimal::from(5),
            }
        );
        let row = store.peek(InventoryItemId::new(1)).await.unwrap();
        assert_eq!(row.quantity_on_hand, Decimal::from(5));
    }

    #[tokio::test]
    async fn decrement_unknown_product_fails() {
        let store = InMemoryInventoryItemStore::new();

        let err = store
            .decrement_quantity_on_hand(ProductId::new(404), Decimal::ONE)
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::NoInventoryForProduct(ProductId::new(404)));
    }

    #[tokio::test]
    async fn decrement_rejects_non_positive_quantity() {
        let store = InMemoryInventoryItemStore::new();
        store.seed(InventoryItem::new(ProductId::new(7), 5)).await;

        let err = store
            .decrement_quantity_on_hand(ProductId::new(7), Decimal::ZERO)
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::InvalidQuantity(Decimal::ZERO));
    }

    #[tokio::test]
    async fn concurrent_decrements_never_overcommit() {
        let store = InMemoryInventoryItemStore::new();
        store
            .seed(InventoryItem::new(ProductId::new(7), 10).with_id(InventoryItemId::new(1)))
            .await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .decrement_quantity_on_hand(ProductId::new(7), Decimal::from(3))
                        .await
                })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        let row = store.peek(InventoryItemId::new(1)).await.unwrap();
        assert_eq!(row.quantity_on_hand, Decimal::ONE);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = InMemoryProductStore::new();
        store.set_unavailable(true);

        let err = store.get_by_id(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
