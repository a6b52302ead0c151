use common::{InventoryItem, ProductId};
use rust_decimal::Decimal;

use crate::rule::{Rule, RuleViolation};

/// Quantity on hand must never be negative.
pub struct QuantityOnHandValidityRule {
    product_id: ProductId,
    quantity_on_hand: Decimal,
}

impl QuantityOnHandValidityRule {
    pub fn new(item: &InventoryItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity_on_hand: item.quantity_on_hand,
        }
    }
}

impl Rule for QuantityOnHandValidityRule {
    fn name(&self) -> &'static str {
        "QuantityOnHandValidity"
    }

    fn evaluate(&self) -> Result<(), RuleViolation> {
        if self.quantity_on_hand < Decimal::ZERO {
            return Err(RuleViolation::NegativeQuantityOnHand {
                product_id: self.product_id,
                quantity_on_hand: self.quantity_on_hand,
            });
        }
        Ok(())
    }
}

/// A decrement must remove a positive quantity.
pub struct DecrementQuantityValidityRule {
    quantity: Decimal,
}

impl DecrementQuantityValidityRule {
    pub fn new(quantity: Decimal) -> Self {
        Self { quantity }
    }
}

impl Rule for DecrementQuantityValidityRule {
    fn name(&self) -> &'static str {
        "DecrementQuantityValidity"
    }

    fn evaluate(&self) -> Result<(), RuleViolation> {
        if self.quantity <= Decimal::ZERO {
            return Err(RuleViolation::InvalidQuantity {
                quantity: self.quantity,
            });
        }
        Ok(())
    }
}
