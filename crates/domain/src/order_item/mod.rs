//! Order item rules and service, including the compensating ship command.

mod rules;
mod service;

pub use rules::{
    CanSubmitOrderItemRule, OrderItemAmountValidityRule, OrderItemPriceValidityRule,
    ValidOrderItemStateRule,
};
pub use service::OrderItemService;
