//! Inbound webhook events.

use serde::Deserialize;
use serde_json::Value;

use super::webhook_errors::WebhookError;
use crate::domain::foundation::OrderId;

/// Event status reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookStatus {
    Completed,
    Failed,
    /// Any status this integration does not act on.
    Other(String),
}

impl WebhookStatus {
    fn parse(raw: &str) -> Self {
        match raw.trim() {
            "completed" => WebhookStatus::Completed,
            "failed" => WebhookStatus::Failed,
            other => WebhookStatus::Other(other.to_string()),
        }
    }
}

/// A verified, parsed webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub order_id: OrderId,
    pub status: WebhookStatus,
    pub transaction_id: Option<String>,
}

#[derive(Deserialize)]
struct RawEvent {
    order_id: Option<Value>,
    status: Option<Value>,
    transaction_id: Option<Value>,
}

impl WebhookEvent {
    /// Decodes the JSON body.
    ///
    /// `order_id` may be a JSON integer or a numeric string; `status` must be
    /// a string; `transaction_id` is optional except for `completed` events.
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        let raw: RawEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::MalformedPayload(format!("invalid JSON: {}", e)))?;

        let order_id = match raw.order_id {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|id| OrderId::new(id).ok())
                .ok_or_else(|| WebhookError::MalformedPayload("invalid order_id".to_string()))?,
            Some(Value::String(s)) => s
                .parse::<OrderId>()
                .map_err(|_| WebhookError::MalformedPayload("invalid order_id".to_string()))?,
            Some(Value::Null) | None => {
                return Err(WebhookError::MalformedPayload("missing order_id".to_string()))
            }
            Some(_) => return Err(WebhookError::MalformedPayload("invalid order_id".to_string())),
        };

        let status = match raw.status {
            Some(Value::String(s)) => WebhookStatus::parse(&s),
            Some(Value::Null) | None => {
                return Err(WebhookError::MalformedPayload("missing status".to_string()))
            }
            Some(_) => return Err(WebhookError::MalformedPayload("invalid status".to_string())),
        };

        let transaction_id = match raw.transaction_id {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        if status == WebhookStatus::Completed && transaction_id.is_none() {
            return Err(WebhookError::MalformedPayload(
                "completed event without transaction_id".to_string(),
            ));
        }

        Ok(WebhookEvent {
            order_id,
            status,
            transaction_id,
        })
    }
}
