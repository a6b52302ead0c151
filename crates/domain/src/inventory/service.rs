use async_trait::async_trait;
use common::{InventoryItem, ProductId};
use rust_decimal::Decimal;
use store::InventoryItemDataProxy;

use crate::command::Command;
use crate::error::ServiceError;
use crate::rule::{Rule, RuleSet};
use crate::service::ServiceBase;

use super::{DecrementQuantityValidityRule, QuantityOnHandValidityRule};

/// Service for managing inventory items.
pub struct InventoryItemService<I: InventoryItemDataProxy> {
    data_proxy: I,
}

impl<I: InventoryItemDataProxy> InventoryItemService<I> {
    /// Creates a new inventory service over the given data proxy.
    pub fn new(data_proxy: I) -> Self {
        Self { data_proxy }
    }

    /// Returns the inventory row of a product.
    pub fn get_by_product_command(&self, product_id: ProductId) -> Command<'_, InventoryItem> {
        Command::new("inventory.get_by_product", move || async move {
            self.data_proxy
                .get_by_product(product_id)
                .await
                .map_err(ServiceError::from)
        })
    }

    /// Removes `quantity` from a product's stock.
    ///
    /// Fails with [`ServiceError::InsufficientStock`] when the stock is too
    /// low, in which case nothing is decremented.
    pub fn decrement_quantity_on_hand_command(
        &self,
        product_id: ProductId,
        quantity: Decimal,
    ) -> Command<'_, InventoryItem> {
        Command::new("inventory.decrement_quantity_on_hand", move || async move {
            self.data_proxy
                .decrement_quantity_on_hand(product_id, quantity)
                .await
                .map_err(ServiceError::from)
        })
        .with_rules(move || async move {
            let rules: RuleSet = vec![Box::new(DecrementQuantityValidityRule::new(quantity))];
            Ok::<_, ServiceError>(rules)
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<InventoryItem, ServiceError> {
        self.get_by_product_command(product_id).execute().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn decrement_quantity_on_hand(
        &self,
        product_id: ProductId,
        quantity: Decimal,
    ) -> Result<InventoryItem, ServiceError> {
        self.decrement_quantity_on_hand_command(product_id, quantity)
            .execute()
            .await
    }

    fn quantity_rules(item: &InventoryItem) -> RuleSet {
        let rule: Box<dyn Rule> = Box::new(QuantityOnHandValidityRule::new(item));
        vec![rule]
    }
}

#[async_trait]
impl<I: InventoryItemDataProxy> ServiceBase for InventoryItemService<I> {
    type Entity = InventoryItem;
    type Proxy = I;

    fn data_proxy(&self) -> &I {
        &self.data_proxy
    }

    async fn rules_for_insert(&self, entity: &InventoryItem) -> Result<RuleSet, ServiceError> {
        Ok(Self::quantity_rules(entity))
    }

    async fn rules_for_update(&self, entity: &InventoryItem) -> Result<RuleSet, ServiceError> {
        Ok(Self::quantity_rules(entity))
    }
}
