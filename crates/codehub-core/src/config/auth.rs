//! Bearer-token validation configuration.

use serde::{Deserialize, Serialize};

/// Settings for validating externally issued HS256 access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC-SHA256 secret.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Clock-skew tolerance in seconds when checking `exp`.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Expected `iss` claim; unchecked when absent.
    #[serde(default)]
    pub issuer: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            leeway_seconds: default_leeway(),
            issuer: None,
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_leeway() -> u64 {
    5
}
