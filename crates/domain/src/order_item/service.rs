use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, OrderItem, OrderItemId, OrderItemStatus, Product};
use store::{DataProxy, InventoryItemDataProxy, OrderItemDataProxy, ProductDataProxy};

use crate::command::Command;
use crate::config::{ExecutionMode, ServiceConfig};
use crate::error::ServiceError;
use crate::inventory::InventoryItemService;
use crate::rule::{Rule, RuleSet};
use crate::service::ServiceBase;

use super::{
    CanSubmitOrderItemRule, OrderItemAmountValidityRule, OrderItemPriceValidityRule,
    ValidOrderItemStateRule,
};

/// Service for managing order items.
///
/// Inserts and updates are validated against the current product. Status
/// moves only through [`submit_command`](Self::submit_command) and
/// [`ship_command`](Self::ship_command).
pub struct OrderItemService<O, P, I>
where
    O: OrderItemDataProxy,
    P: ProductDataProxy,
    I: InventoryItemDataProxy,
{
    data_proxy: O,
    products: P,
    inventory: InventoryItemService<I>,
    config: ServiceConfig,
}

impl<O, P, I> OrderItemService<O, P, I>
where
    O: OrderItemDataProxy,
    P: ProductDataProxy,
    I: InventoryItemDataProxy,
{
    /// Creates a new order item service.
    pub fn new(
        data_proxy: O,
        products: P,
        inventory: InventoryItemService<I>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            data_proxy,
            products,
            inventory,
            config,
        }
    }

    pub fn inventory(&self) -> &InventoryItemService<I> {
        &self.inventory
    }

    /// Returns every item of an order.
    pub fn get_by_order_command(&self, order_id: OrderId) -> Command<'_, Vec<OrderItem>> {
        Command::new("order_item.get_by_order", move || async move {
            self.data_proxy
                .get_by_order(order_id)
                .await
                .map_err(ServiceError::from)
        })
    }

    /// Moves a pending item to `Submitted`.
    ///
    /// In strict mode the persisted item is read and checked before the
    /// write. In latency-prone mode that read and check are skipped.
    pub fn submit_command(
        &self,
        order_item_id: OrderItemId,
        mode: ExecutionMode,
    ) -> Command<'_, OrderItem> {
        Command::new("order_item.submit", move || async move {
            self.data_proxy
                .submit(order_item_id, Utc::now())
                .await
                .map_err(ServiceError::from)
        })
        .with_rules(move || self.submit_rules(order_item_id, mode))
    }

    /// Ships an item, or back-orders it when stock is short.
    ///
    /// The executor reads the item, then runs the inventory decrement. If the
    /// decrement succeeds the item becomes `Shipped`. If it fails with
    /// insufficient stock the item becomes `BackOrdered` and that is returned
    /// as success. Any other decrement failure is returned unchanged and the
    /// item is left as it was.
    ///
    /// The command has no rule guard. The store refuses a second terminal
    /// transition, but only after the decrement has run.
    ///
    /// The decrement and the status write are separate effects. A failure of
    /// the status write does not restore the decremented stock.
    pub fn ship_command(&self, order_item_id: OrderItemId) -> Command<'_, OrderItem> {
        Command::new("order_item.ship", move || self.ship_or_back_order(order_item_id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>, ServiceError> {
        self.get_by_order_command(order_id).execute().await
    }

    /// Submits an item using the configured execution mode.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self, order_item_id: OrderItemId) -> Result<OrderItem, ServiceError> {
        self.submit_command(order_item_id, self.config.execution_mode)
            .execute()
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn ship(&self, order_item_id: OrderItemId) -> Result<OrderItem, ServiceError> {
        self.ship_command(order_item_id).execute().await
    }

    async fn submit_rules(
        &self,
        order_item_id: OrderItemId,
        mode: ExecutionMode,
    ) -> Result<RuleSet, ServiceError> {
        if mode.is_latency_prone() {
            return Ok(RuleSet::new());
        }
        let persisted = self.data_proxy.get_by_id(order_item_id).await?;
        let rule: Box<dyn Rule> = Box::new(CanSubmitOrderItemRule::new(&persisted));
        Ok(vec![rule])
    }

    async fn ship_or_back_order(
        &self,
        order_item_id: OrderItemId,
    ) -> Result<OrderItem, ServiceError> {
        let order_item = self.data_proxy.get_by_id(order_item_id).await?;

        let decrement = self
            .inventory
            .decrement_quantity_on_hand_command(order_item.product_id, order_item.quantity);

        match decrement.execute().await {
            Ok(inventory_item) => {
                let shipped = self.data_proxy.ship(order_item_id, Utc::now()).await?;
                tracing::info!(
                    %order_item_id,
                    product_id = %order_item.product_id,
                    remaining = %inventory_item.quantity_on_hand,
                    "order item shipped"
                );
                metrics::counter!("order_items_shipped_total").increment(1);
                Ok(shipped)
            }
            Err(ServiceError::InsufficientStock {
                product_id,
                requested,
                on_hand,
            }) => {
                tracing::warn!(
                    %order_item_id,
                    %product_id,
                    %requested,
                    %on_hand,
                    "insufficient stock, back-ordering order item"
                );
                let back_ordered = self
                    .data_proxy
                    .back_order(order_item_id, Utc::now())
                    .await?;
                metrics::counter!("order_items_back_ordered_total").increment(1);
                Ok(back_ordered)
            }
            Err(err) => Err(err),
        }
    }

    async fn product_for(&self, item: &OrderItem) -> Result<Product, ServiceError> {
        Ok(self.products.get_by_id(item.product_id).await?)
    }

    fn product_rules(&self, item: &OrderItem, product: &Product) -> [Box<dyn Rule>; 2] {
        [
            Box::new(OrderItemPriceValidityRule::new(
                item,
                product,
                self.config.price_tolerance,
            )),
            Box::new(OrderItemAmountValidityRule::new(item, product)),
        ]
    }
}

#[async_trait]
impl<O, P, I> ServiceBase for OrderItemService<O, P, I>
where
    O: OrderItemDataProxy,
    P: ProductDataProxy,
    I: InventoryItemDataProxy,
{
    type Entity = OrderItem;
    type Proxy = O;

    fn data_proxy(&self) -> &O {
        &self.data_proxy
    }

    /// New items always start pending, whatever the caller sent.
    fn on_before_insert(&self, entity: &mut OrderItem) {
        entity.status = OrderItemStatus::Pending;
        entity.submitted_on = None;
        entity.shipped_on = None;
        entity.back_ordered_on = None;
    }

    /// Updates never carry a status change. The state guard only lets
    /// pending rows through, so pending is what gets written back.
    fn on_before_update(&self, entity: &mut OrderItem) {
        self.on_before_insert(entity);
    }

    async fn rules_for_insert(&self, entity: &OrderItem) -> Result<RuleSet, ServiceError> {
        let product = self.product_for(entity).await?;
        Ok(self.product_rules(entity, &product).into())
    }

    async fn rules_for_update(&self, entity: &OrderItem) -> Result<RuleSet, ServiceError> {
        let persisted = self.data_proxy.get_by_id(entity.id).await?;
        let product = self.product_for(entity).await?;

        let mut rules: RuleSet = vec![Box::new(ValidOrderItemStateRule::new(&persisted))];
        rules.extend(self.product_rules(entity, &product));
        Ok(rules)
    }
}
