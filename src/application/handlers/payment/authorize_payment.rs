//! AuthorizePaymentHandler - Command handler for charging a card at checkout.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::foundation::OrderId;
use crate::domain::payment::{
    AmountCodec, CardValidator, GatewayMode, Order, OrderStatus, PaymentError, PaymentOutcome,
    PaymentRequestBuilder, RawCardInput, ResponseInterpreter,
};
use crate::ports::{GatewayClient, OrderStore, StatusUpdate};

use super::transition::transition;

/// Command to authorize payment for a pending order.
#[derive(Debug, Clone)]
pub struct AuthorizePaymentCommand {
    pub order_id: OrderId,
    pub card: RawCardInput,
}

/// Result of an authorization attempt.
///
/// Processor-side failures are results, not errors: the order has already
/// been updated to match by the time one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizePaymentResult {
    /// Charge accepted; order is paid. Send the customer to `redirect_url`.
    Approved {
        transaction_id: String,
        redirect_url: String,
    },
    /// Processor refused the card; order is failed.
    Declined { reason: String },
    /// Processor answered with an error; order is failed.
    Failed { detail: String },
    /// No response was observed; order stays pending until a webhook settles it.
    OutcomeUnknown { detail: String },
}

/// Handler for checkout payments.
///
/// Validates the order and card, sends exactly one authorization to the
/// processor, and records the outcome on the order. Never retries.
pub struct AuthorizePaymentHandler {
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn GatewayClient>,
    builder: PaymentRequestBuilder,
    mode: GatewayMode,
    configured: bool,
    currencies: Vec<String>,
}

impl AuthorizePaymentHandler {
    pub fn new(
        config: &GatewayConfig,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn GatewayClient>,
    ) -> Self {
        Self {
            orders,
            gateway,
            builder: PaymentRequestBuilder::new(
                AmountCodec::new(config.max_amount),
                config.webhook_url.clone(),
            ),
            mode: config.mode(),
            configured: config.is_configured(),
            currencies: config.supported_currencies_list(),
        }
    }

    /// Same gate as checkout availability: credentials for the active mode
    /// and a supported order currency.
    fn check_available(&self, order: &Order) -> Result<(), PaymentError> {
        if !self.configured {
            tracing::error!(
                order_id = %order.id,
                mode = %self.mode,
                "Payment rejected: gateway credentials missing"
            );
            return Err(PaymentError::GatewayUnavailable(self.mode));
        }

        let currency = order.currency.trim();
        if !self.currencies.iter().any(|c| c.eq_ignore_ascii_case(currency)) {
            return Err(PaymentError::UnsupportedCurrency(order.currency.clone()));
        }
        Ok(())
    }

    pub async fn handle(
        &self,
        cmd: AuthorizePaymentCommand,
    ) -> Result<AuthorizePaymentResult, PaymentError> {
        // 1. Load the order; only pending orders can be charged
        let order = self
            .orders
            .get_order(cmd.order_id)
            .await?
            .ok_or(PaymentError::OrderNotFound(cmd.order_id))?;

        if order.status != OrderStatus::Pending {
            return Err(PaymentError::InvalidState {
                order_id: order.id,
                status: order.status,
                action: "authorized",
            });
        }

        // 2. Gateway availability and order rules before card data is touched
        self.check_available(&order)?;
        PaymentRequestBuilder::check_order(&order)?;

        // 3. Card fields, all problems at once
        let card = CardValidator::validate(&cmd.card).map_err(PaymentError::InvalidCard)?;

        // 4. Assemble the request
        let request = self.builder.build(&order, card, self.mode)?;

        tracing::info!(
            order_id = %order.id,
            amount_minor = request.amount_minor(),
            currency = request.currency(),
            card_last4 = request.card().last4(),
            mode = %self.mode,
            "Payment attempt"
        );

        // 5. One attempt, no retry
        let raw = match self.gateway.authorize(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id,
                    error = %e,
                    "Payment outcome unknown, leaving order pending"
                );
                let detail = e.to_string();
                self.orders
                    .add_note(
                        order.id,
                        &format!(
                            "Payment outcome unknown: {}. Awaiting gateway confirmation.",
                            detail
                        ),
                    )
                    .await?;
                return Ok(AuthorizePaymentResult::OutcomeUnknown { detail });
            }
        };

        // 6. Record the interpreted outcome
        match ResponseInterpreter::interpret(raw.status, &raw.body) {
            PaymentOutcome::Authorized { transaction_id } => {
                self.record_success(&order, transaction_id).await
            }
            PaymentOutcome::Declined { reason } => {
                self.record_failure(&order, &reason).await?;
                Ok(AuthorizePaymentResult::Declined { reason })
            }
            PaymentOutcome::GatewayError { detail } => {
                self.record_failure(&order, &detail).await?;
                Ok(AuthorizePaymentResult::Failed { detail })
            }
        }
    }

    async fn record_success(
        &self,
        order: &Order,
        transaction_id: String,
    ) -> Result<AuthorizePaymentResult, PaymentError> {
        let note = format!(
            "Payment completed via gateway. Transaction ID: {}",
            transaction_id
        );

        match transition(
            self.orders.as_ref(),
            order.id,
            OrderStatus::Pending,
            OrderStatus::Paid,
            &note,
        )
        .await?
        {
            // A webhook may have confirmed the same payment first
            StatusUpdate::Applied | StatusUpdate::Conflict(OrderStatus::Paid) => {}
            StatusUpdate::Conflict(current) => {
                tracing::error!(
                    order_id = %order.id,
                    transaction_id = %transaction_id,
                    current_status = %current,
                    "Payment authorized but order left pending state"
                );
                return Ok(AuthorizePaymentResult::Failed {
                    detail: format!(
                        "Order {} is {}; authorized transaction {} needs manual review",
                        order.id, current, transaction_id
                    ),
                });
            }
        }

        self.orders
            .set_transaction_id(order.id, &transaction_id)
            .await?;

        if let Err(e) = self.orders.clear_cart().await {
            tracing::warn!(order_id = %order.id, error = %e, "Failed to clear cart");
        }

        tracing::info!(
            order_id = %order.id,
            transaction_id = %transaction_id,
            "Payment success"
        );

        Ok(AuthorizePaymentResult::Approved {
            transaction_id,
            redirect_url: order.return_url.clone(),
        })
    }

    async fn record_failure(&self, order: &Order, reason: &str) -> Result<(), PaymentError> {
        tracing::warn!(order_id = %order.id, reason = %reason, "Payment failure");

        let note = format!("Payment failed: {}", reason);
        let update = transition(
            self.orders.as_ref(),
            order.id,
            OrderStatus::Pending,
            OrderStatus::Failed,
            &note,
        )
        .await?;

        if let StatusUpdate::Conflict(current) = update {
            tracing::warn!(
                order_id = %order.id,
                current_status = %current,
                "Order already settled, failure not recorded"
            );
        }
        Ok(())
    }
}
