//! Gateway mode selection.

use serde::{Deserialize, Serialize};

/// Which credential/endpoint set a call runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// Test transactions, no real money movement.
    #[default]
    Sandbox,
    Live,
}

impl GatewayMode {
    pub fn is_sandbox(&self) -> bool {
        matches!(self, GatewayMode::Sandbox)
    }
}

impl std::fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayMode::Sandbox => write!(f, "sandbox"),
            GatewayMode::Live => write!(f, "live"),
        }
    }
}
