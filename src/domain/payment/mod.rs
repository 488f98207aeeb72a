//! Payment domain - card checks, amounts, orders, requests, outcomes and
//! webhook verification.

mod amount;
mod card;
mod errors;
mod mode;
mod order;
mod outcome;
mod request;
mod webhook_errors;
mod webhook_event;
mod webhook_verifier;

pub use amount::{default_max_amount, AmountCodec, AmountError};
pub use card::{CardField, CardFieldError, CardValidator, RawCardInput, ValidatedCard};
pub use errors::PaymentError;
pub use mode::GatewayMode;
pub use order::{BillingContact, Order, OrderStatus};
pub use outcome::{PaymentOutcome, RefundOutcome, ResponseInterpreter};
pub use request::{
    CallbackUrls, OrderViolation, PaymentRequest, PaymentRequestBuilder, RequestBuildError,
};
pub use webhook_errors::WebhookError;
pub use webhook_event::{WebhookEvent, WebhookStatus};
pub use webhook_verifier::{sign_payload, WebhookVerifier};
