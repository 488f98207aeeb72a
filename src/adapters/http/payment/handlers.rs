//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to the card gateway.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::application::{
    AuthorizePaymentCommand, AuthorizePaymentResult, HandleGatewayWebhookCommand, PaymentGateway,
    RefundPaymentCommand,
};
use crate::domain::foundation::OrderId;
use crate::domain::payment::{PaymentError, RefundOutcome};

use super::dto::{
    AuthorizePaymentRequest, AuthorizePaymentResponse, ErrorResponse, RefundPaymentRequest,
    RefundPaymentResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for payment routes.
#[derive(Clone)]
pub struct PaymentAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    /// Header the processor puts the webhook signature in.
    pub signature_header: String,
    /// Bearer token for merchant-only routes. When empty those routes
    /// reject every request.
    pub admin_token: Arc<SecretString>,
}

impl PaymentAppState {
    pub fn new(gateway: Arc<dyn PaymentGateway>, signature_header: impl Into<String>) -> Self {
        Self {
            gateway,
            signature_header: signature_header.into(),
            admin_token: Arc::new(SecretString::new(String::new())),
        }
    }

    pub fn with_admin_token(mut self, token: SecretString) -> Self {
        self.admin_token = Arc::new(token);
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Merchant Authentication
// ════════════════════════════════════════════════════════════════════════════════

/// Merchant administrator, authenticated by the configured bearer token.
///
/// Expects `Authorization: Bearer <admin token>`.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

/// Rejection type for AdminAuth extraction.
pub struct AdminAuthRequired;

impl IntoResponse for AdminAuthRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new(
            "AUTHENTICATION_REQUIRED",
            "Administrator authentication is required",
        );
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<PaymentAppState> for AdminAuth {
    type Rejection = AdminAuthRequired;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PaymentAppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.admin_token.expose_secret();
        let provided = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .unwrap_or_default();

        if expected.is_empty() || provided.is_empty() {
            tracing::warn!(path = %parts.uri.path(), "Admin request without credentials");
            return Err(AdminAuthRequired);
        }
        if !bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            tracing::warn!(path = %parts.uri.path(), "Admin request with invalid credentials");
            return Err(AdminAuthRequired);
        }
        Ok(AdminAuth)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/orders/:order_id/payments - Pay for an order by card
pub async fn authorize_payment(
    State(state): State<PaymentAppState>,
    Path(order_id): Path<String>,
    Json(request): Json<AuthorizePaymentRequest>,
) -> Result<Response, PaymentApiError> {
    let order_id = parse_order_id(&order_id)?;

    let cmd = AuthorizePaymentCommand {
        order_id,
        card: request.into_card_input(),
    };
    let result = state.gateway.authorize(cmd).await?;

    let status = match &result {
        AuthorizePaymentResult::Approved { .. } => StatusCode::OK,
        AuthorizePaymentResult::Declined { .. } => StatusCode::PAYMENT_REQUIRED,
        AuthorizePaymentResult::Failed { .. } => StatusCode::BAD_GATEWAY,
        AuthorizePaymentResult::OutcomeUnknown { .. } => StatusCode::ACCEPTED,
    };
    Ok((status, Json(AuthorizePaymentResponse::from(result))).into_response())
}

/// POST /api/orders/:order_id/refunds - Refund all or part of a paid order
///
/// Merchant only; see [`AdminAuth`].
pub async fn refund_payment(
    _admin: AdminAuth,
    State(state): State<PaymentAppState>,
    Path(order_id): Path<String>,
    Json(request): Json<RefundPaymentRequest>,
) -> Result<Response, PaymentApiError> {
    let order_id = parse_order_id(&order_id)?;

    let cmd = RefundPaymentCommand {
        order_id,
        amount: request.amount,
        reason: request.reason,
    };
    let outcome = state.gateway.refund(cmd).await?;

    let status = match &outcome {
        RefundOutcome::Refunded { .. } => StatusCode::OK,
        RefundOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    Ok((status, Json(RefundPaymentResponse::from(outcome))).into_response())
}

/// POST /webhooks/gateway - Handle processor webhook events
///
/// Answers in plain text; the processor only looks at the status code.
pub async fn handle_gateway_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(state.signature_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleGatewayWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match state.gateway.handle_webhook(cmd).await {
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(e) => {
            if e.is_retryable() {
                tracing::error!(error = %e, "Webhook not applied, processor will redeliver");
            } else {
                tracing::warn!(error = %e, "Webhook rejected");
            }
            (e.status_code(), e.to_string()).into_response()
        }
    }
}

fn parse_order_id(raw: &str) -> Result<OrderId, PaymentApiError> {
    raw.parse::<OrderId>()
        .map_err(|_| PaymentApiError::InvalidOrderId(raw.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
#[derive(Debug)]
pub enum PaymentApiError {
    InvalidOrderId(String),
    Payment(PaymentError),
}

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self::Payment(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let err = match self {
            PaymentApiError::InvalidOrderId(raw) => {
                let body = ErrorResponse::new(
                    "VALIDATION_FAILED",
                    format!("Invalid order id: {}", raw),
                );
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            PaymentApiError::Payment(err) => err,
        };

        let (status, code) = match &err {
            PaymentError::InvalidCard(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CARD"),
            PaymentError::InvalidOrder(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ORDER"),
            PaymentError::Amount(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_AMOUNT"),
            PaymentError::GatewayUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "GATEWAY_UNAVAILABLE")
            }
            PaymentError::UnsupportedCurrency(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNSUPPORTED_CURRENCY")
            }
            PaymentError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            PaymentError::NoTransaction(_) => (StatusCode::CONFLICT, "NO_TRANSACTION"),
            PaymentError::InvalidState { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION")
            }
            PaymentError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = match &err {
            PaymentError::InvalidCard(_) | PaymentError::InvalidOrder(_) => {
                ErrorResponse::with_details(
                    code,
                    "Please correct the highlighted fields.",
                    serde_json::json!({ "errors": err.messages() }),
                )
            }
            PaymentError::Store(detail) => {
                tracing::error!(error = %detail, "Order store failure");
                ErrorResponse::new(code, "Internal server error")
            }
            other => ErrorResponse::new(code, other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
