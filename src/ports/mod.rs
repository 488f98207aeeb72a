//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `OrderStore` - Read platform orders and compare-and-set their payment status
//! - `GatewayClient` - Transport to the remote payment processor

mod gateway_client;
mod order_store;

pub use gateway_client::{GatewayClient, RawResponse, RefundRequest, TransportError};
pub use order_store::{OrderStore, StatusUpdate};
