//! Payment processor adapters.
//!
//! - `HttpGatewayClient` - reqwest transport to the processor API
//! - `MockGatewayClient` - scripted client for tests

mod http_client;
mod mock_gateway_client;

pub use http_client::HttpGatewayClient;
pub use mock_gateway_client::{GatewayCall, MockGatewayClient};
