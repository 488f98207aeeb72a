//! Payment HTTP adapter.
//!
//! Exposes checkout payment, refund and processor webhook endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AuthorizePaymentRequest, AuthorizePaymentResponse, ErrorResponse, RefundPaymentRequest,
    RefundPaymentResponse,
};
pub use handlers::{AdminAuth, AdminAuthRequired, PaymentApiError, PaymentAppState};
pub use routes::{payment_router, payment_routes, webhook_routes};
