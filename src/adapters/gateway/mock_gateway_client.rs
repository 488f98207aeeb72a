//! Mock gateway client for testing.
//!
//! Provides a configurable implementation of `GatewayClient` for unit and
//! integration tests. Supports:
//! - Queued responses per endpoint
//! - Transport error injection
//! - Call tracking (never records card numbers or CVCs)

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::foundation::OrderId;
use crate::domain::payment::PaymentRequest;
use crate::ports::{GatewayClient, RawResponse, RefundRequest, TransportError};

/// Mock gateway client for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockGatewayClient::new();
/// mock.push_authorize(Ok(RawResponse::new(
///     200,
///     r#"{"success":false,"message":"Insufficient funds"}"#,
/// )));
///
/// let response = mock.authorize(&request).await?;
/// assert_eq!(mock.authorize_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockGatewayClient {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    authorize_responses: VecDeque<Result<RawResponse, TransportError>>,
    refund_responses: VecDeque<Result<RawResponse, TransportError>>,
    call_log: Vec<GatewayCall>,
    sequence: u32,
}

/// Recorded call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Authorize {
        order_id: OrderId,
        amount_minor: i64,
        currency: String,
        card_last4: String,
    },
    Refund {
        order_id: OrderId,
        transaction_id: String,
        amount_minor: i64,
    },
}

impl MockGatewayClient {
    /// Creates a mock that approves every call unless told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose next authorization approves with `transaction_id`.
    pub fn approving(transaction_id: &str) -> Self {
        let mock = Self::new();
        mock.push_authorize(Ok(RawResponse::new(
            200,
            format!(r#"{{"success":true,"transaction_id":"{}"}}"#, transaction_id),
        )));
        mock
    }

    /// Creates a mock whose next authorization is declined with `message`.
    pub fn declining(message: &str) -> Self {
        let mock = Self::new();
        mock.push_authorize(Ok(RawResponse::new(
            200,
            format!(r#"{{"success":false,"message":"{}"}}"#, message),
        )));
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Queues the result of the next `authorize` call.
    pub fn push_authorize(&self, response: Result<RawResponse, TransportError>) {
        self.state().authorize_responses.push_back(response);
    }

    /// Queues the result of the next `refund` call.
    pub fn push_refund(&self, response: Result<RawResponse, TransportError>) {
        self.state().refund_responses.push_back(response);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertion Helpers
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().call_log.clone()
    }

    pub fn authorize_count(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::Authorize { .. }))
    }

    pub fn refund_count(&self) -> usize {
        self.count(|c| matches!(c, GatewayCall::Refund { .. }))
    }

    fn count(&self, predicate: impl Fn(&GatewayCall) -> bool) -> usize {
        self.state().call_log.iter().filter(|c| predicate(c)).count()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GatewayClient for MockGatewayClient {
    async fn authorize(&self, request: &PaymentRequest) -> Result<RawResponse, TransportError> {
        let mut state = self.state();
        state.call_log.push(GatewayCall::Authorize {
            order_id: request.order_id(),
            amount_minor: request.amount_minor(),
            currency: request.currency().to_string(),
            card_last4: request.card().last4().to_string(),
        });
        state.sequence += 1;
        let sequence = state.sequence;

        state.authorize_responses.pop_front().unwrap_or_else(|| {
            Ok(RawResponse::new(
                200,
                format!(r#"{{"success":true,"transaction_id":"tx_mock_{}"}}"#, sequence),
            ))
        })
    }

    async fn refund(&self, request: &RefundRequest) -> Result<RawResponse, TransportError> {
        let mut state = self.state();
        state.call_log.push(GatewayCall::Refund {
            order_id: request.order_id,
            transaction_id: request.transaction_id.clone(),
            amount_minor: request.amount_minor,
        });
        state.sequence += 1;
        let sequence = state.sequence;

        state.refund_responses.pop_front().unwrap_or_else(|| {
            Ok(RawResponse::new(
                200,
                format!(r#"{{"refund_id":"rf_mock_{}"}}"#, sequence),
            ))
        })
    }
}
