use crate::domain::envelope::Params;
use crate::domain::plugin::PluginEntry;

/// Maps one logical operation to the ordered steps that perform it.
///
/// Implementations are pure: the same params always yield the same list.
pub trait Shortcut: Send + Sync {
    fn plugins(&self, params: &Params) -> Vec<PluginEntry>;
}

/// A fixed list of registry identifiers, independent of params.
#[derive(Debug, Clone)]
pub struct StaticShortcut {
    ids: Vec<&'static str>,
}

impl StaticShortcut {
    pub fn new(ids: &[&'static str]) -> Self {
        Self { ids: ids.to_vec() }
    }
}

impl Shortcut for StaticShortcut {
    fn plugins(&self, _params: &Params) -> Vec<PluginEntry> {
        self.ids.iter().map(|id| PluginEntry::named(*id)).collect()
    }
}

impl<F> Shortcut for F
where
    F: Fn(&Params) -> Vec<PluginEntry> + Send + Sync,
{
    fn plugins(&self, params: &Params) -> Vec<PluginEntry> {
        self(params)
    }
}
