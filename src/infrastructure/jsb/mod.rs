//! Jiangsu Bank (Jsb) aggregated payment gateway.
//!
//! Requests are form-encoded and signed with an HMAC-SHA256 over the fields
//! in the order they were written. Answers come back as a form-encoded body
//! signed the same way.

pub mod plugins;
pub mod shortcuts;

use crate::config::JsbConfig;
use crate::domain::envelope::{Payload, value_to_string};
use crate::domain::plugin::PluginEntry;
use crate::domain::ports::Gateway;
use crate::error::{ConfigErrorCode, PayError, Result};
use crate::infrastructure::registry::StaticRegistry;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

pub const START: &str = "jsb.start";
pub const PAY_SCAN: &str = "jsb.pay.scan";
pub const PAY_QUERY: &str = "jsb.pay.query";
pub const PAY_REFUND: &str = "jsb.pay.refund";
pub const ADD_PAYLOAD_SIGN: &str = "jsb.add_payload_sign";
pub const ADD_RADAR: &str = "jsb.add_radar";
pub const VERIFY_SIGNATURE: &str = "jsb.verify_signature";
pub const RESPONSE: &str = "jsb.response";
pub const PARSER: &str = "jsb.parser";

pub const SCAN: &str = "jsb.scan";
pub const QUERY: &str = "jsb.query";
pub const REFUND: &str = "jsb.refund";

/// Value of the `signType` field.
pub const SIGN_TYPE: &str = "HMAC-SHA256";

/// Fields that carry the signature and are left out of the signed content.
const SIGN_FIELDS: [&str; 2] = ["signType", "signData"];

type HmacSha256 = Hmac<Sha256>;

/// Steps every Jsb chain ends with, in order.
const COMMON_TAIL: [&str; 5] = [ADD_PAYLOAD_SIGN, ADD_RADAR, VERIFY_SIGNATURE, RESPONSE, PARSER];

#[derive(Debug, Clone)]
pub struct JsbGateway {
    config: Arc<JsbConfig>,
}

impl JsbGateway {
    pub fn new(config: JsbConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &JsbConfig {
        &self.config
    }

    /// Builds a registry holding every Jsb plugin and shortcut.
    pub fn registry(&self) -> StaticRegistry {
        let mut registry = StaticRegistry::new();
        self.register(&mut registry);
        registry
    }

    pub fn register(&self, registry: &mut StaticRegistry) {
        let config = &self.config;
        registry
            .register_plugin(START, plugins::StartPlugin::new(config.clone()))
            .register_plugin(PAY_SCAN, plugins::ScanPayPlugin)
            .register_plugin(PAY_QUERY, plugins::QueryPlugin)
            .register_plugin(PAY_REFUND, plugins::RefundPlugin)
            .register_plugin(ADD_PAYLOAD_SIGN, plugins::AddPayloadSignPlugin::new(config.clone()))
            .register_plugin(ADD_RADAR, plugins::AddRadarPlugin::new(config.clone()))
            .register_plugin(VERIFY_SIGNATURE, plugins::VerifySignaturePlugin::new(config.clone()))
            .register_plugin(RESPONSE, plugins::ResponsePlugin)
            .register_plugin(PARSER, plugins::ParserPlugin)
            .register_shortcut(SCAN, shortcuts::ScanShortcut)
            .register_shortcut(QUERY, shortcuts::QueryShortcut)
            .register_shortcut(REFUND, shortcuts::RefundShortcut);
    }
}

impl Gateway for JsbGateway {
    fn name(&self) -> &str {
        "jsb"
    }

    /// Wraps the business steps with `jsb.start` and the sign → radar →
    /// verify → response → parser tail. Common steps already listed by the
    /// shortcut are not repeated; business steps keep their relative order.
    fn merge_common_plugins(&self, plugins: Vec<PluginEntry>) -> Vec<PluginEntry> {
        let is_common = |entry: &PluginEntry| match entry {
            PluginEntry::Named(id) => id == START || COMMON_TAIL.contains(&id.as_str()),
            _ => false,
        };

        let mut merged = vec![PluginEntry::named(START)];
        merged.extend(plugins.into_iter().filter(|entry| !is_common(entry)));
        merged.extend(COMMON_TAIL.iter().map(|id| PluginEntry::named(*id)));
        merged
    }
}

/// `k=v&k=v` over the non-empty, non-signature fields, in payload order.
pub fn sign_content(payload: &Payload) -> String {
    payload
        .iter()
        .filter(|(key, _)| !SIGN_FIELDS.contains(key))
        .map(|(key, value)| (key, value_to_string(value)))
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn keyed_mac(content: &str, key: &str) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|e| {
        PayError::invalid_config(
            ConfigErrorCode::SignKeyInvalid,
            format!("merchant sign key rejected: {e}"),
        )
    })?;
    mac.update(content.as_bytes());
    Ok(mac)
}

/// Hex HMAC-SHA256 of `content` under the merchant key.
pub fn sign(content: &str, key: &str) -> Result<String> {
    Ok(hex::encode(keyed_mac(content, key)?.finalize().into_bytes()))
}

/// Checks a hex signature in constant time. Malformed hex never matches.
pub fn verify(content: &str, key: &str, signature: &str) -> Result<bool> {
    let Ok(expected) = hex::decode(signature) else {
        return Ok(false);
    };
    Ok(keyed_mac(content, key)?.verify_slice(&expected).is_ok())
}
