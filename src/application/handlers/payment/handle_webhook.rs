//! HandleGatewayWebhookHandler - Command handler for processor webhooks.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, StateMachine};
use crate::domain::payment::{
    Order, OrderStatus, WebhookError, WebhookEvent, WebhookStatus, WebhookVerifier,
};
use crate::ports::{OrderStore, StatusUpdate};

use super::transition::transition;

/// Compare-and-set attempts before giving up on a contended order.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// Command to handle a processor webhook.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Signature header value, if present.
    pub signature: Option<String>,
}

/// Result of webhook processing. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleGatewayWebhookResult {
    /// Order moved to paid.
    PaymentConfirmed {
        order_id: OrderId,
        transaction_id: String,
    },
    /// Order moved to failed.
    PaymentFailed { order_id: OrderId },
    /// Order already had the reported status (redelivery).
    AlreadyApplied {
        order_id: OrderId,
        status: OrderStatus,
    },
    /// Event accepted without changes (unknown status or stale event).
    Ignored { order_id: OrderId, reason: String },
}

/// Handler for processor webhooks.
///
/// Verifies the signature over the raw bytes before anything else, then
/// applies the reported status to the order. Deliveries are at-least-once,
/// so redelivered and out-of-order events are acknowledged without change.
pub struct HandleGatewayWebhookHandler {
    orders: Arc<dyn OrderStore>,
    verifier: WebhookVerifier,
}

impl HandleGatewayWebhookHandler {
    pub fn new(orders: Arc<dyn OrderStore>, verifier: WebhookVerifier) -> Self {
        Self { orders, verifier }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, WebhookError> {
        // 1. Verify over raw bytes; nothing is parsed on failure
        if let Err(e) = self.verifier.verify(&cmd.payload, cmd.signature.as_deref()) {
            tracing::warn!(
                payload_len = cmd.payload.len(),
                signature_present = cmd.signature.is_some(),
                "Webhook rejected: signature verification failed"
            );
            return Err(e);
        }

        // 2. Parse
        let event = WebhookEvent::parse(&cmd.payload).map_err(|e| {
            tracing::warn!(error = %e, "Webhook rejected: malformed payload");
            e
        })?;

        tracing::info!(
            order_id = %event.order_id,
            status = ?event.status,
            transaction_id = ?event.transaction_id,
            "Webhook received"
        );

        // 3. Map to a target status
        let target = match &event.status {
            WebhookStatus::Completed => OrderStatus::Paid,
            WebhookStatus::Failed => OrderStatus::Failed,
            WebhookStatus::Other(status) => {
                tracing::info!(
                    order_id = %event.order_id,
                    status = %status,
                    "Webhook status not handled, acknowledging"
                );
                // Unknown orders still fail with 404 so misrouted events surface
                self.load(event.order_id).await?;
                return Ok(HandleGatewayWebhookResult::Ignored {
                    order_id: event.order_id,
                    reason: format!("unhandled status '{}'", status),
                });
            }
        };

        // 4. Apply, re-reading the order if another writer got there first
        for _ in 0..MAX_TRANSITION_ATTEMPTS {
            let order = self.load(event.order_id).await?;
            if let Some(result) = self.apply(&order, &event, target).await? {
                return Ok(result);
            }
        }

        tracing::error!(
            order_id = %event.order_id,
            attempts = MAX_TRANSITION_ATTEMPTS,
            "Webhook transition kept conflicting"
        );
        Err(WebhookError::Store(format!(
            "Order {} changed concurrently",
            event.order_id
        )))
    }

    async fn load(&self, order_id: OrderId) -> Result<Order, WebhookError> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or(WebhookError::OrderNotFound(order_id))
    }

    /// Returns `None` when the compare-and-set lost a race and should be retried.
    async fn apply(
        &self,
        order: &Order,
        event: &WebhookEvent,
        target: OrderStatus,
    ) -> Result<Option<HandleGatewayWebhookResult>, WebhookError> {
        let transaction_id = event.transaction_id.as_deref().unwrap_or_default();

        if order.status == target {
            // Repair a paid order whose transaction id write was lost
            if target == OrderStatus::Paid && order.stored_transaction_id().is_none() {
                self.orders
                    .set_transaction_id(order.id, transaction_id)
                    .await?;
            }
            tracing::debug!(order_id = %order.id, status = %target, "Webhook already applied");
            return Ok(Some(HandleGatewayWebhookResult::AlreadyApplied {
                order_id: order.id,
                status: target,
            }));
        }

        if !order.status.can_transition_to(&target) {
            tracing::warn!(
                order_id = %order.id,
                current_status = %order.status,
                reported_status = %target,
                "Stale webhook ignored"
            );
            return Ok(Some(HandleGatewayWebhookResult::Ignored {
                order_id: order.id,
                reason: format!("order is {}, cannot become {}", order.status, target),
            }));
        }

        let note = match target {
            OrderStatus::Paid => format!(
                "Payment confirmed via webhook. Transaction ID: {}",
                transaction_id
            ),
            _ => "Payment failed via webhook.".to_string(),
        };

        match transition(self.orders.as_ref(), order.id, order.status, target, &note).await? {
            StatusUpdate::Conflict(current) => {
                tracing::debug!(
                    order_id = %order.id,
                    current_status = %current,
                    "Webhook transition conflicted, retrying"
                );
                Ok(None)
            }
            StatusUpdate::Applied if target == OrderStatus::Paid => {
                self.orders
                    .set_transaction_id(order.id, transaction_id)
                    .await?;
                tracing::info!(
                    order_id = %order.id,
                    transaction_id = %transaction_id,
                    "Payment confirmed via webhook"
                );
                Ok(Some(HandleGatewayWebhookResult::PaymentConfirmed {
                    order_id: order.id,
                    transaction_id: transaction_id.to_string(),
                }))
            }
            StatusUpdate::Applied => {
                tracing::info!(order_id = %order.id, "Payment failed via webhook");
                Ok(Some(HandleGatewayWebhookResult::PaymentFailed { order_id: order.id }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::test_support::*;
    use crate::adapters::memory::InMemoryOrderStore;
    use crate::domain::payment::sign_payload;
    use secrecy::SecretString;

    fn handler(store: Arc<InMemoryOrderStore>) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            store,
            WebhookVerifier::new(SecretString::new(SECRET.to_string())),
        )
    }

    fn signed(body: &str) -> HandleGatewayWebhookCommand {
        HandleGatewayWebhookCommand {
            payload: body.as_bytes().to_vec(),
            signature: Some(sign_payload(SECRET, body.as_bytes()).unwrap()),
        }
    }

    const COMPLETED: &str = r#"{"order_id":1,"status":"completed","transaction_id":"tx_1"}"#;
    const FAILED: &str = r#"{"order_id":1,"status":"failed"}"#;

    async fn status_of(store: &InMemoryOrderStore) -> OrderStatus {
        store.get_order(order_id()).await.unwrap().unwrap().status
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Verification
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_signature_is_rejected_without_mutation() {
        let store = store_with(pending_order()).await;
        let cmd = HandleGatewayWebhookCommand {
            payload: COMPLETED.as_bytes().to_vec(),
            signature: None,
        };

        let err = handler(store.clone()).handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::Unauthorized));
        assert_eq!(status_of(&store).await, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn wrong_signature_is_rejected_before_parsing() {
        let store = store_with(pending_order()).await;
        let cmd = HandleGatewayWebhookCommand {
            payload: b"not even json".to_vec(),
            signature: Some(sign_payload("other_secret", b"not even json").unwrap()),
        };

        let err = handler(store).handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::Unauthorized));
    }

    #[tokio::test]
    async fn signed_garbage_is_malformed() {
        let store = store_with(pending_order()).await;

        let err = handler(store).handle(signed("{")).await.unwrap_err();

        assert!(matches!(err, WebhookError::MalformedPayload(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Transitions
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn completed_event_marks_order_paid() {
        let store = store_with(pending_order()).await;

        let result = handler(store.clone()).handle(signed(COMPLETED)).await.unwrap();

        assert_eq!(
            result,
            HandleGatewayWebhookResult::PaymentConfirmed {
                order_id: order_id(),
                transaction_id: "tx_1".to_string(),
            }
        );
        let order = store.get_order(order_id()).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.transaction_id.as_deref(), Some("tx_1"));
        assert_eq!(
            store.notes(order_id()).await,
            vec!["Payment confirmed via webhook. Transaction ID: tx_1".to_string()]
        );
    }

    #[tokio::test]
    async fn redelivered_completed_event_is_a_no_op() {
        let store = store_with(pending_order()).await;
        let handler = handler(store.clone());

        handler.handle(signed(COMPLETED)).await.unwrap();
        let second = handler.handle(signed(COMPLETED)).await.unwrap();

        assert_eq!(
            second,
            HandleGatewayWebhookResult::AlreadyApplied {
                order_id: order_id(),
                status: OrderStatus::Paid,
            }
        );
        assert_eq!(store.notes(order_id()).await.len(), 1);
    }

    #[tokio::test]
    async fn failed_event_marks_order_failed() {
        let store = store_with(pending_order()).await;

        let result = handler(store.clone()).handle(signed(FAILED)).await.unwrap();

        assert_eq!(
            result,
            HandleGatewayWebhookResult::PaymentFailed {
                order_id: order_id()
            }
        );
        assert_eq!(status_of(&store).await, OrderStatus::Failed);
    }

    #[tokio::test]
    async fn stale_failed_event_does_not_overwrite_paid() {
        let store = store_with(pending_order()).await;
        let handler = handler(store.clone());
        handler.handle(signed(COMPLETED)).await.unwrap();

        let result = handler.handle(signed(FAILED)).await.unwrap();

        assert!(matches!(result, HandleGatewayWebhookResult::Ignored { .. }));
        assert_eq!(status_of(&store).await, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn unknown_status_is_acknowledged() {
        let store = store_with(pending_order()).await;
        let body = r#"{"order_id":"1","status":"disputed"}"#;

        let result = handler(store.clone()).handle(signed(body)).await.unwrap();

        assert!(matches!(result, HandleGatewayWebhookResult::Ignored { .. }));
        assert_eq!(status_of(&store).await, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let store = store_with(pending_order()).await;
        let body = r#"{"order_id":404,"status":"failed"}"#;

        let err = handler(store).handle(signed(body)).await.unwrap_err();

        assert!(matches!(err, WebhookError::OrderNotFound(id) if id.value() == 404));
    }

    #[tokio::test]
    async fn store_failure_is_retryable_error() {
        let store = store_with(pending_order()).await;
        store.set_unavailable(true);

        let err = handler(store).handle(signed(COMPLETED)).await.unwrap_err();

        assert!(matches!(err, WebhookError::Store(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn concurrent_deliveries_pay_exactly_once() {
        let store = store_with(pending_order()).await;
        let handler = Arc::new(handler(store.clone()));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let handler = handler.clone();
            tasks.push(tokio::spawn(async move {
                handler.handle(signed(COMPLETED)).await.unwrap()
            }));
        }

        let mut confirmed = 0;
        for task in tasks {
            if matches!(
                task.await.unwrap(),
                HandleGatewayWebhookResult::PaymentConfirmed { .. }
            ) {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 1);
        assert_eq!(store.notes(order_id()).await.len(), 1);
    }
}
