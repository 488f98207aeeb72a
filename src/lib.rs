//! Payment Gateway - card payments through a remote processor
//!
//! Validates card input, charges orders through the processor's HTTP API,
//! applies signed webhook notifications and coordinates refunds. Orders are
//! owned by the commerce platform and reached through the `OrderStore` port.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
