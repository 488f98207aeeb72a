//! RefundPaymentHandler - Command handler for refunding a paid order.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::config::GatewayConfig;
use crate::domain::foundation::OrderId;
use crate::domain::payment::{
    AmountCodec, AmountError, GatewayMode, Order, OrderStatus, PaymentError, RefundOutcome,
    ResponseInterpreter,
};
use crate::ports::{GatewayClient, OrderStore, RefundRequest, StatusUpdate};

use super::transition::transition;

const FULLY_REFUNDED_NOTE: &str = "Order fully refunded.";

/// Command to refund all or part of a paid order.
#[derive(Debug, Clone)]
pub struct RefundPaymentCommand {
    pub order_id: OrderId,
    /// Amount to refund in major units.
    pub amount: Decimal,
    pub reason: String,
}

/// Handler for refunds.
///
/// Fails fast, with no network call, when the order has nothing to refund.
/// Refunds are bounded by what is left of the order total after earlier
/// refunds, and run one at a time so two partial refunds cannot both pass
/// that bound. A refund the processor does not confirm leaves the order
/// untouched and is never retried here.
pub struct RefundPaymentHandler {
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn GatewayClient>,
    codec: AmountCodec,
    mode: GatewayMode,
    in_flight: Mutex<()>,
}

impl RefundPaymentHandler {
    pub fn new(
        config: &GatewayConfig,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn GatewayClient>,
    ) -> Self {
        Self {
            orders,
            gateway,
            codec: AmountCodec::new(config.max_amount),
            mode: config.mode(),
            in_flight: Mutex::new(()),
        }
    }

    pub async fn handle(&self, cmd: RefundPaymentCommand) -> Result<RefundOutcome, PaymentError> {
        let _guard = self.in_flight.lock().await;

        let order = self
            .orders
            .get_order(cmd.order_id)
            .await?
            .ok_or(PaymentError::OrderNotFound(cmd.order_id))?;

        let transaction_id = order
            .stored_transaction_id()
            .ok_or(PaymentError::NoTransaction(order.id))?
            .to_string();

        if order.status != OrderStatus::Paid {
            return Err(PaymentError::InvalidState {
                order_id: order.id,
                status: order.status,
                action: "refunded",
            });
        }

        let refundable = order.refundable_amount();
        if cmd.amount > refundable {
            return Err(AmountError::ExceedsMaximum {
                amount: cmd.amount,
                max: refundable,
            }
            .into());
        }
        let amount_minor = self.codec.to_minor_units(cmd.amount)?;

        let request = RefundRequest {
            mode: self.mode,
            order_id: order.id,
            transaction_id,
            amount_minor,
            reason: cmd.reason,
        };

        tracing::info!(
            order_id = %order.id,
            transaction_id = %request.transaction_id,
            amount_minor,
            already_refunded = %order.total_refunded,
            "Refund attempt"
        );

        let outcome = match self.gateway.refund(&request).await {
            Ok(raw) => ResponseInterpreter::interpret_refund(raw.status, &raw.body),
            Err(e) => RefundOutcome::Failed {
                detail: e.to_string(),
            },
        };

        match &outcome {
            RefundOutcome::Refunded { refund_id } => {
                tracing::info!(order_id = %order.id, refund_id = ?refund_id, "Refund processed");
                self.record_refund(&order, cmd.amount, refund_id.as_deref())
                    .await;
            }
            RefundOutcome::Failed { detail } => {
                tracing::warn!(order_id = %order.id, detail = %detail, "Refund failed");
            }
        }

        Ok(outcome)
    }

    /// Adds the refund to the order and closes it once refunds cover the
    /// whole total.
    ///
    /// Money has already moved at this point, so store failures are logged
    /// rather than returned.
    async fn record_refund(&self, order: &Order, amount: Decimal, refund_id: Option<&str>) {
        let note = match refund_id {
            Some(id) => format!("Refund processed. Refund ID: {}", id),
            None => "Refund processed.".to_string(),
        };

        let refunded_total = match self.orders.record_refund(order.id, amount, &note).await {
            Ok(total) => total,
            Err(e) => {
                tracing::error!(
                    order_id = %order.id,
                    error = %e,
                    "Failed to record refund on order"
                );
                return;
            }
        };

        if refunded_total < order.total {
            return;
        }

        match transition(
            self.orders.as_ref(),
            order.id,
            OrderStatus::Paid,
            OrderStatus::Refunded,
            FULLY_REFUNDED_NOTE,
        )
        .await
        {
            Ok(StatusUpdate::Applied) => {
                tracing::info!(
                    order_id = %order.id,
                    refunded_total = %refunded_total,
                    "Order fully refunded"
                );
            }
            Ok(StatusUpdate::Conflict(current)) => {
                tracing::warn!(
                    order_id = %order.id,
                    current_status = %current,
                    "Order changed before refund was recorded"
                );
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Failed to close refunded order");
            }
        }
    }
}
