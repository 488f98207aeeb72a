//! Payment handlers.
//!
//! ## Commands
//! - Authorizing a card payment at checkout
//! - Processing processor webhooks
//! - Refunding a paid order

mod authorize_payment;
mod handle_webhook;
mod refund_payment;
mod transition;

#[cfg(test)]
mod test_support;

pub use authorize_payment::{
    AuthorizePaymentCommand, AuthorizePaymentHandler, AuthorizePaymentResult,
};
pub use handle_webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
};
pub use refund_payment::{RefundPaymentCommand, RefundPaymentHandler};
