//! Axum router configuration for payment endpoints.

use axum::{routing::post, Router};

use super::handlers::{authorize_payment, handle_gateway_webhook, refund_payment, PaymentAppState};

/// Create the payment API router.
///
/// # Routes
/// - `POST /orders/:order_id/payments` - Pay for a pending order by card
/// - `POST /orders/:order_id/refunds` - Refund a paid order
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/orders/:order_id/payments", post(authorize_payment))
        .route("/orders/:order_id/refunds", post(refund_payment))
}

/// Create the processor webhook router.
///
/// Webhooks carry no user authentication; they are verified by signature.
///
/// # Routes
/// - `POST /gateway` - Handle processor webhooks
pub fn webhook_routes() -> Router<PaymentAppState> {
    Router::new().route("/gateway", post(handle_gateway_webhook))
}

/// Create the complete payment router, mounted at `/api` and `/webhooks`.
///
/// # Example
///
/// ```ignore
/// let state = PaymentAppState::new(gateway, config.signature_header.clone());
/// let app = payment_router().with_state(state);
/// ```
pub fn payment_router() -> Router<PaymentAppState> {
    Router::new()
        .nest("/api", payment_routes())
        .nest("/webhooks", webhook_routes())
}
