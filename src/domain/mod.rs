//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine)
//! - `payment` - Card validation, amounts, orders, outcomes and webhooks

pub mod foundation;
pub mod payment;
