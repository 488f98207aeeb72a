//! HTTP listener and operator settings

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Longest inbound request the service will wait on.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Shortest admin token accepted when one is configured.
const MIN_ADMIN_TOKEN_LEN: usize = 16;

/// Listener, logging and operator settings, read from `PAYMENT_GATEWAY__SERVER__*`.
///
/// Every field is optional in the environment; missing ones take the
/// values from [`ServerConfig::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind, e.g. `0.0.0.0` or `::1`.
    pub host: String,

    pub port: u16,

    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,

    pub request_timeout_secs: u64,

    /// Bearer token for merchant-only routes such as refunds. Empty keeps
    /// those routes closed.
    pub admin_token: SecretString,

    /// JSON array of orders loaded into the in-memory store at startup.
    pub orders_file: Option<PathBuf>,
}

/// Deployment stage, selects log format
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_level: "info,payment_gateway=debug".to_string(),
            request_timeout_secs: 60,
            admin_token: SecretString::new(String::new()),
            orders_file: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ValidationError::InvalidBindAddress(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// True when merchant-only routes can be reached at all.
    pub fn has_admin_token(&self) -> bool {
        !self.admin_token.expose_secret().is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.has_admin_token() && self.admin_token.expose_secret().len() < MIN_ADMIN_TOKEN_LEN
        {
            return Err(ValidationError::WeakAdminToken(MIN_ADMIN_TOKEN_LEN));
        }
        self.socket_addr().map(|_| ())
    }
}
