use crate::domain::plugin::Plugin;
use crate::domain::ports::{Component, Resolver};
use crate::domain::shortcut::Shortcut;
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier → component table, filled once at start-up.
///
/// Plugins and shortcuts share one namespace, so an identifier registered
/// as a plugin is not a valid shortcut and vice versa.
#[derive(Default, Clone)]
pub struct StaticRegistry {
    components: HashMap<String, Component>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_plugin<P: Plugin + 'static>(
        &mut self,
        id: impl Into<String>,
        plugin: P,
    ) -> &mut Self {
        self.components
            .insert(id.into(), Component::Plugin(Arc::new(plugin)));
        self
    }

    pub fn register_shortcut<S: Shortcut + 'static>(
        &mut self,
        id: impl Into<String>,
        shortcut: S,
    ) -> &mut Self {
        self.components
            .insert(id.into(), Component::Shortcut(Arc::new(shortcut)));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Resolver for StaticRegistry {
    fn resolve(&self, id: &str) -> Option<Component> {
        self.components.get(id).cloned()
    }
}
