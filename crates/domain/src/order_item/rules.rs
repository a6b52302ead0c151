use common::{Money, OrderItem, OrderItemId, OrderItemStatus, Product, ProductId};
use rust_decimal::Decimal;

use crate::rule::{Rule, RuleViolation};

/// The item price must match the product's current price within a tolerance.
pub struct OrderItemPriceValidityRule {
    product_id: ProductId,
    price: Money,
    current_price: Money,
    tolerance: Money,
}

impl OrderItemPriceValidityRule {
    pub fn new(item: &OrderItem, product: &Product, tolerance: Money) -> Self {
        Self {
            product_id: product.id,
            price: item.price,
            current_price: product.current_price,
            tolerance,
        }
    }
}

impl Rule for OrderItemPriceValidityRule {
    fn name(&self) -> &'static str {
        "OrderItemPriceValidity"
    }

    fn evaluate(&self) -> Result<(), RuleViolation> {
        if !self.price.is_within(self.current_price, self.tolerance) {
            return Err(RuleViolation::PriceMismatch {
                product_id: self.product_id,
                price: self.price,
                current_price: self.current_price,
            });
        }
        Ok(())
    }
}

/// The item quantity must be positive and within the product's available amount.
pub struct OrderItemAmountValidityRule {
    product_id: ProductId,
    requested: Decimal,
    available: Decimal,
}

impl OrderItemAmountValidityRule {
    pub fn new(item: &OrderItem, product: &Product) -> Self {
        Self {
            product_id: product.id,
            requested: item.quantity,
            available: product.available_amount,
        }
    }
}

impl Rule for OrderItemAmountValidityRule {
    fn name(&self) -> &'static str {
        "OrderItemAmountValidity"
    }

    fn evaluate(&self) -> Result<(), RuleViolation> {
        if self.requested <= Decimal::ZERO {
            return Err(RuleViolation::InvalidQuantity {
                quantity: self.requested,
            });
        }
        if self.requested > self.available {
            return Err(RuleViolation::AmountExceedsAvailable {
                product_id: self.product_id,
                requested: self.requested,
                available: self.available,
            });
        }
        Ok(())
    }
}

/// Checks a persisted status against one lifecycle action.
struct StatusGuard {
    order_item_id: OrderItemId,
    status: OrderItemStatus,
    action: &'static str,
    allowed: fn(&OrderItemStatus) -> bool,
}

impl StatusGuard {
    fn check(&self) -> Result<(), RuleViolation> {
        if (self.allowed)(&self.status) {
            Ok(())
        } else {
            Err(RuleViolation::InvalidState {
                order_item_id: self.order_item_id,
                status: self.status,
                action: self.action,
            })
        }
    }
}

/// The persisted item must still be modifiable.
pub struct ValidOrderItemStateRule(StatusGuard);

impl ValidOrderItemStateRule {
    pub fn new(persisted: &OrderItem) -> Self {
        Self(StatusGuard {
            order_item_id: persisted.id,
            status: persisted.status,
            action: "update",
            allowed: OrderItemStatus::can_modify,
        })
    }
}

impl Rule for ValidOrderItemStateRule {
    fn name(&self) -> &'static str {
        "ValidOrderItemState"
    }

    fn evaluate(&self) -> Result<(), RuleViolation> {
        self.0.check()
    }
}

/// The persisted item must be pending to be submitted.
pub struct CanSubmitOrderItemRule(StatusGuard);

impl CanSubmitOrderItemRule {
    pub fn new(persisted: &OrderItem) -> Self {
        Self(StatusGuard {
            order_item_id: persisted.id,
            status: persisted.status,
            action: "submit",
            allowed: OrderItemStatus::can_submit,
        })
    }
}

impl Rule for CanSubmitOrderItemRule {
    fn name(&self) -> &'static str {
        "CanSubmitOrderItem"
    }

    fn evaluate(&self) -> Result<(), RuleViolation> {
        self.0.check()
    }
}
