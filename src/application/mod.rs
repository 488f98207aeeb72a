//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod gateway;
pub mod handlers;

pub use gateway::{CardGateway, PaymentGateway};
pub use handlers::payment::{
    AuthorizePaymentCommand, AuthorizePaymentHandler, AuthorizePaymentResult,
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
    RefundPaymentCommand, RefundPaymentHandler,
};
