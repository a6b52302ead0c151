//! Order item lifecycle.

use serde::{Deserialize, Serialize};

/// The status of an order item in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Submitted ──┬──► Shipped
///                         └──► BackOrdered
/// ```
///
/// Transitions only move forward. `Shipped` and `BackOrdered` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderItemStatus {
    /// Item has been created and can still be modified.
    #[default]
    Pending,

    /// Item has been submitted for fulfillment.
    Submitted,

    /// Inventory was decremented and the item shipped (terminal state).
    Shipped,

    /// Inventory was insufficient at ship time (terminal state).
    BackOrdered,
}

impl OrderItemStatus {
    fn rank(&self) -> u8 {
        match self {
            OrderItemStatus::Pending => 0,
            OrderItemStatus::Submitted => 1,
            OrderItemStatus::Shipped | OrderItemStatus::BackOrdered => 2,
        }
    }

    /// Returns true if the item's fields may be updated in this status.
    pub fn can_modify(&self) -> bool {
        matches!(self, OrderItemStatus::Pending)
    }

    /// Returns true if the item can be submitted in this status.
    pub fn can_submit(&self) -> bool {
        matches!(self, OrderItemStatus::Pending)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderItemStatus::Shipped | OrderItemStatus::BackOrdered)
    }

    /// Returns true if moving to `next` never goes backward.
    ///
    /// Re-applying the current non-terminal status is allowed; nothing leaves
    /// a terminal status.
    pub fn can_transition_to(&self, next: OrderItemStatus) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "Pending",
            OrderItemStatus::Submitted => "Submitted",
            OrderItemStatus::Shipped => "Shipped",
            OrderItemStatus::BackOrdered => "BackOrdered",
        }
    }
}

impl std::fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
