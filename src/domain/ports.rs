use super::event::Event;
use super::plugin::{Plugin, PluginEntry};
use super::radar::{Radar, Response};
use super::shortcut::Shortcut;
use crate::error::TransportError;
use std::sync::Arc;

/// Sends the request described by a radar and returns the raw response.
///
/// Timeouts and cancellation are the transport's business.
pub trait Transport: Send + Sync {
    fn send(&self, radar: &Radar) -> Result<Response, TransportError>;
}

/// Receives lifecycle notifications. Fire-and-forget.
pub trait EventSink: Send + Sync {
    fn dispatch(&self, event: &Event<'_>);
}

impl<F> EventSink for F
where
    F: Fn(&Event<'_>) + Send + Sync,
{
    fn dispatch(&self, event: &Event<'_>) {
        self(event)
    }
}

/// What an identifier stands for in the resolver.
#[derive(Clone)]
pub enum Component {
    Plugin(Arc<dyn Plugin>),
    Shortcut(Arc<dyn Shortcut>),
}

/// Builds instances from identifiers.
pub trait Resolver: Send + Sync {
    fn resolve(&self, id: &str) -> Option<Component>;

    fn plugin(&self, id: &str) -> Option<Arc<dyn Plugin>> {
        match self.resolve(id)? {
            Component::Plugin(plugin) => Some(plugin),
            Component::Shortcut(_) => None,
        }
    }

    fn shortcut(&self, id: &str) -> Option<Arc<dyn Shortcut>> {
        match self.resolve(id)? {
            Component::Shortcut(shortcut) => Some(shortcut),
            Component::Plugin(_) => None,
        }
    }
}

/// Gateway-specific housekeeping merged into every chain built by `call`.
pub trait Gateway: Send + Sync {
    fn name(&self) -> &str;

    fn merge_common_plugins(&self, plugins: Vec<PluginEntry>) -> Vec<PluginEntry>;
}

pub type TransportBox = Arc<dyn Transport>;
pub type EventSinkBox = Arc<dyn EventSink>;
pub type ResolverBox = Arc<dyn Resolver>;

/// Gateway without common plugins; chains run exactly as listed.
#[derive(Debug, Clone, Default)]
pub struct BareGateway;

impl Gateway for BareGateway {
    fn name(&self) -> &str {
        "bare"
    }

    fn merge_common_plugins(&self, plugins: Vec<PluginEntry>) -> Vec<PluginEntry> {
        plugins
    }
}

