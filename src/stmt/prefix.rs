use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{ModuleNamespace, QName};

/// Prefix to module namespace bindings visible inside one source: the
/// source's own prefix plus one entry per import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixToModule {
    bindings: FxHashMap<SmolStr, ModuleNamespace>,
}

impl PrefixToModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: impl Into<SmolStr>, namespace: ModuleNamespace) {
        self.bindings.insert(prefix.into(), namespace);
    }

    pub fn get(&self, prefix: &str) -> Option<&ModuleNamespace> {
        self.bindings.get(prefix)
    }

    /// Qualify `local_name` with the namespace bound to `prefix`.
    pub fn qualify(&self, prefix: &str, local_name: &str) -> Option<QName> {
        self.get(prefix)
            .map(|namespace| QName::new(namespace.as_ref(), local_name))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
