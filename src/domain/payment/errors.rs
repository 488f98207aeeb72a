//! Payment path errors.
//!
//! Processor-side results (decline, gateway error, unknown outcome) are not
//! errors; they travel as outcome values. What remains here are the cases
//! where the request never reached the processor.

use thiserror::Error;

use super::amount::AmountError;
use super::card::CardFieldError;
use super::mode::GatewayMode;
use super::order::OrderStatus;
use super::request::{OrderViolation, RequestBuildError};
use crate::domain::foundation::{DomainError, OrderId};

#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// One or more card fields are malformed (user-correctable).
    #[error("{}", join(.0))]
    InvalidCard(Vec<CardFieldError>),

    /// Order breaks one or more business rules (user-correctable).
    #[error("{}", join(.0))]
    InvalidOrder(Vec<OrderViolation>),

    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Credentials for the active mode are not set.
    #[error("Card payments are not configured for {0} mode")]
    GatewayUnavailable(GatewayMode),

    #[error("Currency {0} is not supported by this payment method")]
    UnsupportedCurrency(String),

    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// Refund requested for an order that has no stored transaction id.
    #[error("Order {0} has no recorded transaction")]
    NoTransaction(OrderId),

    #[error("Order {order_id} is {status} and cannot be {action}")]
    InvalidState {
        order_id: OrderId,
        status: OrderStatus,
        action: &'static str,
    },

    #[error("Store error: {0}")]
    Store(String),
}

impl PaymentError {
    /// Human-readable messages, one per problem, for display at checkout.
    pub fn messages(&self) -> Vec<String> {
        match self {
            PaymentError::InvalidCard(errors) => errors.iter().map(ToString::to_string).collect(),
            PaymentError::InvalidOrder(violations) => {
                violations.iter().map(ToString::to_string).collect()
            }
            other => vec![other.to_string()],
        }
    }
}

impl From<RequestBuildError> for PaymentError {
    fn from(err: RequestBuildError) -> Self {
        match err {
            RequestBuildError::InvalidOrder(violations) => PaymentError::InvalidOrder(violations),
            RequestBuildError::Amount(e) => PaymentError::Amount(e),
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        PaymentError::Store(err.to_string())
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
