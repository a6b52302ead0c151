//! Service error types.

use common::ProductId;
use rust_decimal::Decimal;
use store::StoreError;
use thiserror::Error;

use crate::rule::RuleViolation;

/// Errors that can occur when executing a command.
///
/// Validation failures are raised before any executor runs and leave storage
/// untouched. Everything the persistence layer reports arrives as `Execution`,
/// except insufficient stock, which has its own variant so the ship command
/// can match on it.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A business rule rejected the command.
    #[error("Validation failed: {0}")]
    Validation(#[from] RuleViolation),

    /// An inventory decrement asked for more than the quantity on hand.
    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, on hand {on_hand}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: Decimal,
        on_hand: Decimal,
    },

    /// The persistence layer failed.
    #[error("Execution failed: {0}")]
    Execution(StoreError),

    /// A blocking executor could not start its runtime.
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    /// A command was executed blocking from inside an async runtime.
    #[error("Command {0} cannot block inside an async runtime; use execute instead")]
    BlockingInRuntime(&'static str),
}

impl ServiceError {
    /// Returns the rule violation if this is a validation failure.
    pub fn violation(&self) -> Option<&RuleViolation> {
        match self {
            ServiceError::Validation(violation) => Some(violation),
            _ => None,
        }
    }

    /// Returns true if a rule rejected the command.
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientStock {
                product_id,
                requested,
                on_hand,
            } => ServiceError::InsufficientStock {
                product_id,
                requested,
                on_hand,
            },
            other => ServiceError::Execution(other),
        }
    }
}
