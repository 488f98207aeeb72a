//! Gateway configuration

use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::payment::{default_max_amount, GatewayMode};

/// Credential pair issued by the processor for one mode.
#[derive(Clone, Deserialize)]
pub struct GatewayCredentials {
    /// Public API key
    #[serde(default = "empty_secret")]
    pub api_key: SecretString,

    /// Secret key used for API auth and webhook signatures
    #[serde(default = "empty_secret")]
    pub secret_key: SecretString,
}

impl GatewayCredentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            secret_key: SecretString::new(secret_key.into()),
        }
    }

    /// Both keys are present
    pub fn is_complete(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
            && !self.secret_key.expose_secret().trim().is_empty()
    }
}

impl Default for GatewayCredentials {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl std::fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Payment processor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Active mode (sandbox or live)
    #[serde(default)]
    pub mode: GatewayMode,

    /// Sandbox credentials
    #[serde(default)]
    pub sandbox: GatewayCredentials,

    /// Live credentials
    #[serde(default)]
    pub live: GatewayCredentials,

    /// Processor API base URL in sandbox mode
    #[serde(default = "default_sandbox_base_url")]
    pub sandbox_base_url: String,

    /// Processor API base URL in live mode
    #[serde(default = "default_live_base_url")]
    pub live_base_url: String,

    /// Absolute URL the processor posts events to
    #[serde(default)]
    pub webhook_url: String,

    /// Header carrying the webhook HMAC
    #[serde(default = "default_signature_header")]
    pub signature_header: String,

    /// Timeout for processor calls in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest chargeable amount in major units
    #[serde(default = "default_max_amount")]
    pub max_amount: Decimal,

    /// Accepted currency codes (comma-separated)
    #[serde(default = "default_supported_currencies")]
    pub supported_currencies: String,
}

impl GatewayConfig {
    /// Active mode
    pub fn mode(&self) -> GatewayMode {
        self.mode
    }

    /// Credentials for a mode
    pub fn credentials(&self, mode: GatewayMode) -> &GatewayCredentials {
        match mode {
            GatewayMode::Sandbox => &self.sandbox,
            GatewayMode::Live => &self.live,
        }
    }

    /// API base URL for a mode, without trailing slash
    pub fn base_url(&self, mode: GatewayMode) -> &str {
        let url = match mode {
            GatewayMode::Sandbox => &self.sandbox_base_url,
            GatewayMode::Live => &self.live_base_url,
        };
        url.trim_end_matches('/')
    }

    pub fn payments_endpoint(&self, mode: GatewayMode) -> String {
        format!("{}/payments", self.base_url(mode))
    }

    pub fn refunds_endpoint(&self, mode: GatewayMode) -> String {
        format!("{}/refunds", self.base_url(mode))
    }

    /// Secret key of the active mode; signs webhooks and authenticates calls
    pub fn active_secret(&self) -> &SecretString {
        &self.credentials(self.mode).secret_key
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Both keys for the active mode are set
    pub fn is_configured(&self) -> bool {
        self.credentials(self.mode).is_complete()
    }

    /// Get supported currencies as a vector
    pub fn supported_currencies_list(&self) -> Vec<String> {
        self.supported_currencies
            .split(',')
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn supports_currency(&self, code: &str) -> bool {
        let code = code.trim();
        self.supported_currencies_list()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
    }

    /// Every settings problem, for display to the merchant.
    pub fn settings_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let label = match self.mode {
            GatewayMode::Sandbox => "Sandbox",
            GatewayMode::Live => "Live",
        };
        let credentials = self.credentials(self.mode);

        if credentials.api_key.expose_secret().trim().is_empty() {
            errors.push(format!("{} API Key is required", label));
        }
        if credentials.secret_key.expose_secret().trim().is_empty() {
            errors.push(format!("{} Secret Key is required", label));
        }
        if !is_http_url(self.base_url(self.mode)) {
            errors.push(format!("{} API base URL must be an http(s) URL", label));
        }
        if self.mode == GatewayMode::Live && !self.base_url(self.mode).starts_with("https://") {
            errors.push("Live API base URL must use HTTPS".to_string());
        }
        if !is_http_url(&self.webhook_url) {
            errors.push("Webhook URL must be an absolute http(s) URL".to_string());
        }
        if self.signature_header.trim().is_empty() {
            errors.push("Signature header name is required".to_string());
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            errors.push("Request timeout must be between 1 and 300 seconds".to_string());
        }
        if self.max_amount <= Decimal::ZERO {
            errors.push("Maximum amount must be greater than zero".to_string());
        }
        if self.supported_currencies_list().is_empty() {
            errors.push("At least one supported currency is required".to_string());
        }

        errors
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let errors = self.settings_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::InvalidGatewaySettings(errors))
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: GatewayMode::default(),
            sandbox: GatewayCredentials::default(),
            live: GatewayCredentials::default(),
            sandbox_base_url: default_sandbox_base_url(),
            live_base_url: default_live_base_url(),
            webhook_url: String::new(),
            signature_header: default_signature_header(),
            request_timeout_secs: default_request_timeout(),
            max_amount: default_max_amount(),
            supported_currencies: default_supported_currencies(),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_sandbox_base_url() -> String {
    "https://api-sandbox.myplugin.com".to_string()
}

fn default_live_base_url() -> String {
    "https://api.myplugin.com".to_string()
}

fn default_signature_header() -> String {
    "X-MyPlugin-Signature".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_supported_currencies() -> String {
    "USD,EUR,GBP,CAD,AUD,JPY".to_string()
}
