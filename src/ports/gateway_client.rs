//! Gateway client port for the remote payment processor.
//!
//! Implementations only move bytes: they send a request and hand back the
//! HTTP status and body. Deciding what a response means is the job of
//! `ResponseInterpreter`, so a client never reports a decline as an error.

use crate::domain::foundation::OrderId;
use crate::domain::payment::{GatewayMode, PaymentRequest};
use async_trait::async_trait;
use thiserror::Error;

/// Port for the processor's payments and refunds endpoints.
///
/// One call is one attempt. Implementations must not retry: a retried
/// authorization can charge the customer twice.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Submit an authorization to the payments endpoint.
    async fn authorize(&self, request: &PaymentRequest) -> Result<RawResponse, TransportError>;

    /// Submit a refund to the refunds endpoint.
    async fn refund(&self, request: &RefundRequest) -> Result<RawResponse, TransportError>;
}

/// Status and body of a processor response, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Refund call payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    pub mode: GatewayMode,
    pub order_id: OrderId,
    pub transaction_id: String,
    /// Refund amount in minor units.
    pub amount_minor: i64,
    pub reason: String,
}

/// No usable response was received.
///
/// The charge may or may not have happened on the processor's side, so the
/// caller must treat the outcome as unknown rather than as a decline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Gateway request timed out")]
    Timeout,

    #[error("Could not connect to gateway: {0}")]
    Connect(String),

    #[error("Gateway request failed: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_client_is_object_safe() {
        fn _accepts_dyn(_client: &dyn GatewayClient) {}
    }

    #[test]
    fn transport_error_messages() {
        assert_eq!(TransportError::Timeout.to_string(), "Gateway request timed out");
        assert_eq!(
            TransportError::Connect("refused".into()).to_string(),
            "Could not connect to gateway: refused"
        );
    }
}
