//! Data Transfer Objects for payment endpoints.
//!
//! Request payloads carry raw card fields, so none of them derive `Debug`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::AuthorizePaymentResult;
use crate::domain::payment::{RawCardInput, RefundOutcome};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to pay for an order by card.
#[derive(Deserialize)]
pub struct AuthorizePaymentRequest {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_expiry: String,
    #[serde(default)]
    pub card_cvc: String,
}

impl AuthorizePaymentRequest {
    pub fn into_card_input(self) -> RawCardInput {
        RawCardInput::new(self.card_number, self.card_expiry, self.card_cvc)
    }
}

/// Request to refund a paid order.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundPaymentRequest {
    /// Amount in major units, e.g. `"10.50"` or `10.5`.
    pub amount: Decimal,
    #[serde(default)]
    pub reason: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Checkout result. `redirect` is set when the customer should move on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizePaymentResponse {
    /// `success`, `declined`, `failed` or `pending`.
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AuthorizePaymentResult> for AuthorizePaymentResponse {
    fn from(result: AuthorizePaymentResult) -> Self {
        match result {
            AuthorizePaymentResult::Approved {
                transaction_id,
                redirect_url,
            } => Self {
                result: "success".to_string(),
                transaction_id: Some(transaction_id),
                redirect: Some(redirect_url),
                message: None,
            },
            AuthorizePaymentResult::Declined { reason } => Self {
                result: "declined".to_string(),
                transaction_id: None,
                redirect: None,
                message: Some(reason),
            },
            AuthorizePaymentResult::Failed { detail } => Self {
                result: "failed".to_string(),
                transaction_id: None,
                redirect: None,
                message: Some(detail),
            },
            AuthorizePaymentResult::OutcomeUnknown { .. } => Self {
                result: "pending".to_string(),
                transaction_id: None,
                redirect: None,
                message: Some(
                    "Payment is being confirmed. You will be notified once it completes."
                        .to_string(),
                ),
            },
        }
    }
}

/// Refund result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefundPaymentResponse {
    pub refunded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<RefundOutcome> for RefundPaymentResponse {
    fn from(outcome: RefundOutcome) -> Self {
        match outcome {
            RefundOutcome::Refunded { refund_id } => Self {
                refunded: true,
                refund_id,
                message: None,
            },
            RefundOutcome::Failed { detail } => Self {
                refunded: false,
                refund_id: None,
                message: Some(detail),
            },
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn authorize_request_tolerates_missing_fields() {
        let request: AuthorizePaymentRequest =
            serde_json::from_str(r#"{"card_number":"4111111111111111"}"#).unwrap();
        let input = request.into_card_input();
        assert_eq!(input.number, "4111111111111111");
        assert!(input.expiry.is_empty());
    }

    #[test]
    fn refund_request_accepts_string_or_number_amount() {
        let from_str: RefundPaymentRequest =
            serde_json::from_str(r#"{"amount":"10.50"}"#).unwrap();
        let from_num: RefundPaymentRequest =
            serde_json::from_str(r#"{"amount":10.5,"reason":"damaged"}"#).unwrap();
        assert_eq!(from_str.amount, dec!(10.50));
        assert_eq!(from_num.amount, dec!(10.5));
        assert_eq!(from_num.reason, "damaged");
    }

    #[test]
    fn approved_result_carries_redirect() {
        let response = AuthorizePaymentResponse::from(AuthorizePaymentResult::Approved {
            transaction_id: "tx_1".to_string(),
            redirect_url: "https://shop.example/thanks".to_string(),
        });
        assert_eq!(response.result, "success");
        assert_eq!(response.redirect.as_deref(), Some("https://shop.example/thanks"));
    }

    #[test]
    fn unknown_outcome_reports_pending() {
        let response = AuthorizePaymentResponse::from(AuthorizePaymentResult::OutcomeUnknown {
            detail: "Gateway request timed out".to_string(),
        });
        assert_eq!(response.result, "pending");
        assert!(response.transaction_id.is_none());
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse::new("ORDER_NOT_FOUND", "missing")).unwrap();
        assert_eq!(json, serde_json::json!({"code":"ORDER_NOT_FOUND","message":"missing"}));
    }
}
