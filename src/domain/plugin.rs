use crate::domain::envelope::Envelope;
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Continuation handed to every step: the rest of the chain.
pub type Next<'a> = &'a dyn Fn(Envelope) -> Result<Envelope>;

/// A bare callable step.
pub type StepFn = Arc<dyn Fn(Envelope, Next<'_>) -> Result<Envelope> + Send + Sync>;

/// A named step of the processing chain.
///
/// `assembly` may forward to `next` (optionally post-processing what comes
/// back), return without calling it to stop the chain, or forward a
/// replaced envelope. Implementations keep no state between envelopes.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn assembly(&self, envelope: Envelope, next: Next<'_>) -> Result<Envelope>;
}

/// A reference to a step as listed by a shortcut or a caller, before it has
/// been checked against the resolver.
#[derive(Clone)]
pub enum PluginEntry {
    /// A closure; always eligible.
    Direct { label: String, step: StepFn },
    /// An already built plugin; always eligible.
    Instance(Arc<dyn Plugin>),
    /// A registry identifier, resolved at validation time.
    Named(String),
}

impl PluginEntry {
    pub fn direct<F>(label: impl Into<String>, step: F) -> Self
    where
        F: Fn(Envelope, Next<'_>) -> Result<Envelope> + Send + Sync + 'static,
    {
        PluginEntry::Direct {
            label: label.into(),
            step: Arc::new(step),
        }
    }

    pub fn named(id: impl Into<String>) -> Self {
        PluginEntry::Named(id.into())
    }

    pub fn instance<P: Plugin + 'static>(plugin: P) -> Self {
        PluginEntry::Instance(Arc::new(plugin))
    }

    pub fn label(&self) -> &str {
        match self {
            PluginEntry::Direct { label, .. } => label,
            PluginEntry::Instance(plugin) => plugin.name(),
            PluginEntry::Named(id) => id,
        }
    }
}

impl From<&str> for PluginEntry {
    fn from(id: &str) -> Self {
        PluginEntry::named(id)
    }
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginEntry::Direct { label, .. } => f.debug_tuple("Direct").field(label).finish(),
            PluginEntry::Instance(plugin) => {
                f.debug_tuple("Instance").field(&plugin.name()).finish()
            }
            PluginEntry::Named(id) => f.debug_tuple("Named").field(id).finish(),
        }
    }
}

/// A step that passed validation and can be run by the pipeline.
#[derive(Clone)]
pub enum Step {
    Direct { label: String, step: StepFn },
    Named(Arc<dyn Plugin>),
}

impl Step {
    pub fn direct<F>(label: impl Into<String>, step: F) -> Self
    where
        F: Fn(Envelope, Next<'_>) -> Result<Envelope> + Send + Sync + 'static,
    {
        Step::Direct {
            label: label.into(),
            step: Arc::new(step),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Step::Direct { label, .. } => label,
            Step::Named(plugin) => plugin.name(),
        }
    }

    pub fn invoke(&self, envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        match self {
            Step::Direct { step, .. } => step(envelope, next),
            Step::Named(plugin) => plugin.assembly(envelope, next),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Step").field(&self.label()).finish()
    }
}
