use crate::error::{ConfigErrorCode, PayError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

/// Settings for the outbound HTTP transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Overall request deadline, in seconds.
    pub timeout_secs: u64,
    /// Connection establishment deadline, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Merchant credentials and endpoint for the Jsb gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JsbConfig {
    pub partner_id: String,
    pub public_key_code: String,
    /// Shared secret appended to the signing content.
    pub sign_key: String,
    pub endpoint: Url,
}

/// Configuration file layout.
///
/// ```json
/// {
///   "jsb": {
///     "partner_id": "P0001",
///     "public_key_code": "00",
///     "sign_key": "secret",
///     "endpoint": "https://epay.jsbchina.cn:9999/eis/merchant/merchantServices.htm"
///   },
///   "http": { "timeout_secs": 30, "connect_timeout_secs": 10 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub jsb: JsbConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            PayError::invalid_config(
                ConfigErrorCode::ConfigUnreadable,
                format!("cannot read {}: {e}", path.display()),
            )
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            PayError::invalid_config(
                ConfigErrorCode::ConfigUnreadable,
                format!("malformed configuration: {e}"),
            )
        })
    }
}
