//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `gateway` - Payment processor clients (HTTP, mock)
//! - `memory` - In-memory order store
//! - `http` - Axum endpoints

pub mod gateway;
pub mod http;
pub mod memory;

pub use gateway::{HttpGatewayClient, MockGatewayClient};
pub use memory::InMemoryOrderStore;
