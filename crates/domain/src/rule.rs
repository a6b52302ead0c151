//! Business rules and the fail-fast rule engine.

use common::{Money, OrderItemId, OrderItemStatus, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

/// A rule that rejected a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The item price drifted from the product's current price.
    #[error("Price mismatch for product {product_id}: item price {price}, current price {current_price}")]
    PriceMismatch {
        product_id: ProductId,
        price: Money,
        current_price: Money,
    },

    /// The item requests more than the product allows per order line.
    #[error("Quantity {requested} exceeds available amount {available} for product {product_id}")]
    AmountExceedsAvailable {
        product_id: ProductId,
        requested: Decimal,
        available: Decimal,
    },

    /// A quantity was zero or negative.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: Decimal },

    /// The order item's persisted status does not allow the action.
    #[error("Invalid state: cannot {action} order item {order_item_id} in {status} status")]
    InvalidState {
        order_item_id: OrderItemId,
        status: OrderItemStatus,
        action: &'static str,
    },

    /// An inventory row would hold a negative quantity.
    #[error("Quantity on hand {quantity_on_hand} for product {product_id} must not be negative")]
    NegativeQuantityOnHand {
        product_id: ProductId,
        quantity_on_hand: Decimal,
    },
}

impl RuleViolation {
    /// Stable name of the violation kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            RuleViolation::PriceMismatch { .. } => "PriceMismatch",
            RuleViolation::AmountExceedsAvailable { .. } => "AmountExceedsAvailable",
            RuleViolation::InvalidQuantity { .. } => "InvalidQuantity",
            RuleViolation::InvalidState { .. } => "InvalidState",
            RuleViolation::NegativeQuantityOnHand { .. } => "NegativeQuantityOnHand",
        }
    }
}

/// A single business rule.
///
/// A rule is built with every value it checks, so evaluation never does I/O.
/// Any reference data a rule needs is read by whoever builds the rule set.
pub trait Rule: Send + Sync {
    /// Rule name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Checks the rule.
    fn evaluate(&self) -> Result<(), RuleViolation>;
}

/// Ordered rules for one operation. Earlier rules take priority when
/// reporting failures.
pub type RuleSet = Vec<Box<dyn Rule>>;

/// Evaluates rule sets.
pub struct RuleEngine;

impl RuleEngine {
    /// Evaluates rules in order and returns the first violation.
    ///
    /// Rules after the first failing one are not evaluated.
    pub fn evaluate(rules: &[Box<dyn Rule>]) -> Result<(), RuleViolation> {
        for rule in rules {
            if let Err(violation) = rule.evaluate() {
                tracing::debug!(rule = rule.name(), %violation, "rule rejected command");
                metrics::counter!("rule_violations_total", "rule" => rule.name()).increment(1);
                return Err(violation);
            }
        }
        Ok(())
    }

    /// Evaluates every rule and collects all violations.
    pub fn evaluate_all(rules: &[Box<dyn Rule>]) -> Vec<RuleViolation> {
        rules.iter().filter_map(|rule| rule.evaluate().err()).collect()
    }
}
