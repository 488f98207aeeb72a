//! Webhook error types.
//!
//! Every failure before the order transition is durably applied maps to a
//! non-2xx status so the processor redelivers.

use http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, OrderId};

/// Errors that occur during webhook processing.
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    /// Signature header missing, empty, malformed or not matching.
    #[error("Invalid webhook signature")]
    Unauthorized,

    /// Body is not JSON or lacks a required field.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Referenced order does not exist in the store.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// Order store failed while reading or writing.
    #[error("Store error: {0}")]
    Store(String),
}

impl WebhookError {
    /// Returns true if the processor should retry delivering this webhook.
    ///
    /// The HTTP adapter logs these at error level and the rest at warn.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Store(_) | WebhookError::OrderNotFound(_) // Might be eventual consistency
        )
    }

    /// Maps the error to the response status the processor sees.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            WebhookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_displays_without_details() {
        assert_eq!(WebhookError::Unauthorized.to_string(), "Invalid webhook signature");
    }

    #[test]
    fn malformed_payload_displays_reason() {
        let err = WebhookError::MalformedPayload("missing order_id".to_string());
        assert_eq!(err.to_string(), "Malformed payload: missing order_id");
    }

    #[test]
    fn status_codes_match_protocol() {
        let order_id = OrderId::new(5).unwrap();
        assert_eq!(WebhookError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            WebhookError::MalformedPayload("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::OrderNotFound(order_id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebhookError::Store("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn only_store_and_lookup_failures_are_retryable() {
        assert!(WebhookError::Store("timeout".into()).is_retryable());
        assert!(WebhookError::OrderNotFound(OrderId::new(1).unwrap()).is_retryable());
        assert!(!WebhookError::Unauthorized.is_retryable());
        assert!(!WebhookError::MalformedPayload("bad".into()).is_retryable());
    }

    #[test]
    fn domain_error_converts_to_store_error() {
        let err: WebhookError = DomainError::store("connection lost").into();
        assert!(matches!(err, WebhookError::Store(msg) if msg.contains("connection lost")));
    }
}
