//! Interpretation of processor responses.
//!
//! Transport hands back a raw status and body; this module decides what they
//! mean. The classification is strict: anything that is not unambiguously a
//! success is either a decline or an error.

use serde_json::{Map, Value};

const DEFAULT_DECLINE_MESSAGE: &str = "Payment failed";
const HTTP_OK: u16 = 200;

/// Result of one authorization attempt, consumed once by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Processor accepted the charge.
    Authorized { transaction_id: String },

    /// Processor answered and refused the charge.
    Declined { reason: String },

    /// Processor answered with an error status or an unreadable body.
    GatewayError { detail: String },
}

impl PaymentOutcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, PaymentOutcome::Authorized { .. })
    }
}

/// Result of one refund attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundOutcome {
    /// Processor accepted the refund; the id is present when it sent one.
    Refunded { refund_id: Option<String> },

    /// Refund was not confirmed; order state must stay untouched.
    Failed { detail: String },
}

/// Maps processor HTTP responses to typed outcomes.
pub struct ResponseInterpreter;

impl ResponseInterpreter {
    /// Classifies an authorization response.
    ///
    /// - 200, JSON object, truthy `success`, non-empty `transaction_id` ⇒ `Authorized`
    /// - 200, JSON object, `success` falsy or missing ⇒ `Declined` with `message`
    /// - anything else ⇒ `GatewayError`
    pub fn interpret(status: u16, body: &str) -> PaymentOutcome {
        if status != HTTP_OK {
            return PaymentOutcome::GatewayError {
                detail: format!("Gateway returned HTTP {}", status),
            };
        }

        let object = match parse_object(body) {
            Ok(object) => object,
            Err(detail) => return PaymentOutcome::GatewayError { detail },
        };

        let success = object.get("success").map(is_truthy).unwrap_or(false);
        if !success {
            let reason = object
                .get("message")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_DECLINE_MESSAGE)
                .to_string();
            return PaymentOutcome::Declined { reason };
        }

        match object.get("transaction_id").and_then(identifier) {
            Some(transaction_id) => PaymentOutcome::Authorized { transaction_id },
            None => PaymentOutcome::GatewayError {
                detail: "Successful response is missing a transaction id".to_string(),
            },
        }
    }

    /// Classifies a refund response: HTTP 200 with a JSON object body.
    pub fn interpret_refund(status: u16, body: &str) -> RefundOutcome {
        if status != HTTP_OK {
            return RefundOutcome::Failed {
                detail: format!("Gateway returned HTTP {}", status),
            };
        }

        match parse_object(body) {
            Ok(object) => RefundOutcome::Refunded {
                refund_id: object.get("refund_id").and_then(identifier),
            },
            Err(detail) => RefundOutcome::Failed { detail },
        }
    }
}

fn parse_object(body: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err("Gateway response is not a JSON object".to_string()),
        Err(e) => Err(format!("Gateway response is not valid JSON: {}", e)),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
        Value::Null => false,
    }
}

/// Non-empty string or integer identifier.
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        _ => None,
    }
}
