use super::{
    ADD_PAYLOAD_SIGN, ADD_RADAR, PARSER, PAY_QUERY, PAY_REFUND, PAY_SCAN, RESPONSE, START,
    VERIFY_SIGNATURE,
};
use crate::domain::envelope::Params;
use crate::domain::plugin::PluginEntry;
use crate::domain::shortcut::Shortcut;

/// Scan-to-pay, listed in full.
pub struct ScanShortcut;

impl Shortcut for ScanShortcut {
    fn plugins(&self, _params: &Params) -> Vec<PluginEntry> {
        [
            START,
            PAY_SCAN,
            ADD_PAYLOAD_SIGN,
            ADD_RADAR,
            VERIFY_SIGNATURE,
            RESPONSE,
            PARSER,
        ]
        .into_iter()
        .map(PluginEntry::named)
        .collect()
    }
}

pub struct QueryShortcut;

impl Shortcut for QueryShortcut {
    fn plugins(&self, _params: &Params) -> Vec<PluginEntry> {
        vec![PluginEntry::named(PAY_QUERY)]
    }
}

pub struct RefundShortcut;

impl Shortcut for RefundShortcut {
    fn plugins(&self, _params: &Params) -> Vec<PluginEntry> {
        vec![PluginEntry::named(PAY_REFUND)]
    }
}
