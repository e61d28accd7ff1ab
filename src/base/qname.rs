use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use super::constants::YIN_NAMESPACE;

/// Namespace URI of a module, shared by all of its statements.
pub type ModuleNamespace = Arc<str>;

/// A qualified statement keyword: namespace plus local name.
///
/// Built-in statements live in the YIN namespace; extension statements live
/// in the namespace of the module that defines the extension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QName {
    namespace: SmolStr,
    local_name: SmolStr,
}

impl QName {
    pub fn new(namespace: impl Into<SmolStr>, local_name: impl Into<SmolStr>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// A keyword in the built-in (YIN) namespace.
    pub fn yin(local_name: impl Into<SmolStr>) -> Self {
        Self::new(YIN_NAMESPACE, local_name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn is_builtin(&self) -> bool {
        self.namespace == YIN_NAMESPACE
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_builtin() {
            f.write_str(&self.local_name)
        } else {
            write!(f, "({}){}", self.namespace, self.local_name)
        }
    }
}
