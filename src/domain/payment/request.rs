//! Authorization request assembly.
//!
//! [`PaymentRequestBuilder`] is pure: it checks the order's business rules,
//! converts the total to minor units and freezes everything the processor
//! needs into an immutable [`PaymentRequest`].

use thiserror::Error;

use super::amount::{AmountCodec, AmountError};
use super::card::ValidatedCard;
use super::mode::GatewayMode;
use super::order::Order;
use crate::domain::foundation::OrderId;

/// A business rule the order breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderViolation {
    #[error("Order total must be greater than zero")]
    NonPositiveTotal,

    #[error("Invalid currency format: {0}")]
    InvalidCurrency(String),

    #[error("Billing email is required")]
    MissingBillingEmail,

    #[error("Billing country is required")]
    MissingBillingCountry,

    #[error("Billing first name is required")]
    MissingBillingFirstName,

    #[error("Billing last name is required")]
    MissingBillingLastName,
}

/// Why a request could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestBuildError {
    #[error("Order is not payable: {}", join_violations(.0))]
    InvalidOrder(Vec<OrderViolation>),

    #[error(transparent)]
    Amount(#[from] AmountError),
}

fn join_violations(violations: &[OrderViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Redirect and notification targets handed to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrls {
    pub return_url: String,
    pub cancel_url: String,
    pub webhook_url: String,
}

/// Immutable authorization payload for one attempt.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    mode: GatewayMode,
    amount_minor: i64,
    currency: String,
    order_id: OrderId,
    customer_email: String,
    customer_name: String,
    card: ValidatedCard,
    callbacks: CallbackUrls,
}

impl PaymentRequest {
    pub fn mode(&self) -> GatewayMode {
        self.mode
    }

    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn card(&self) -> &ValidatedCard {
        &self.card
    }

    pub fn callbacks(&self) -> &CallbackUrls {
        &self.callbacks
    }
}

/// Builds [`PaymentRequest`]s for one merchant configuration.
#[derive(Debug, Clone)]
pub struct PaymentRequestBuilder {
    codec: AmountCodec,
    webhook_url: String,
}

impl PaymentRequestBuilder {
    pub fn new(codec: AmountCodec, webhook_url: impl Into<String>) -> Self {
        Self {
            codec,
            webhook_url: webhook_url.into(),
        }
    }

    /// Evaluates every order rule and returns all violations.
    pub fn order_violations(order: &Order) -> Vec<OrderViolation> {
        let mut violations = Vec::new();
        let billing = &order.billing;

        if order.total <= rust_decimal::Decimal::ZERO {
            violations.push(OrderViolation::NonPositiveTotal);
        }
        if !AmountCodec::currency_valid(&order.currency) {
            violations.push(OrderViolation::InvalidCurrency(order.currency.clone()));
        }
        if billing.email.trim().is_empty() {
            violations.push(OrderViolation::MissingBillingEmail);
        }
        if billing.country.trim().is_empty() {
            violations.push(OrderViolation::MissingBillingCountry);
        }
        if billing.first_name.trim().is_empty() {
            violations.push(OrderViolation::MissingBillingFirstName);
        }
        if billing.last_name.trim().is_empty() {
            violations.push(OrderViolation::MissingBillingLastName);
        }

        violations
    }

    /// Rejects an order that breaks any business rule, listing all of them.
    pub fn check_order(order: &Order) -> Result<(), RequestBuildError> {
        let violations = Self::order_violations(order);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(RequestBuildError::InvalidOrder(violations))
        }
    }

    /// Assembles the request. Order rules are checked before the card is read.
    pub fn build(
        &self,
        order: &Order,
        card: ValidatedCard,
        mode: GatewayMode,
    ) -> Result<PaymentRequest, RequestBuildError> {
        Self::check_order(order)?;
        let amount_minor = self.codec.to_minor_units(order.total)?;

        Ok(PaymentRequest {
            mode,
            amount_minor,
            currency: order.currency.clone(),
            order_id: order.id,
            customer_email: order.billing.email.trim().to_string(),
            customer_name: order.billing.full_name(),
            card,
            callbacks: CallbackUrls {
                return_url: order.return_url.clone(),
                cancel_url: order.cancel_url.clone(),
                webhook_url: self.webhook_url.clone(),
            },
        })
    }
}
