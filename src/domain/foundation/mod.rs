//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, error types and the state machine contract
//! that the payment domain is built on.

mod errors;
mod ids;
mod state_machine;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::OrderId;
pub use state_machine::StateMachine;
