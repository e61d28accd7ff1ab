use std::sync::Arc;

use crate::base::{QName, StatementSourceReference};

/// A statement exactly as the author wrote it.
///
/// One instance exists per canonical context; every copy of that context
/// shares it.
#[derive(Debug, PartialEq, Eq)]
pub struct DeclaredStatement {
    keyword: QName,
    argument: Option<String>,
    reference: StatementSourceReference,
    substatements: Vec<Arc<DeclaredStatement>>,
}

impl DeclaredStatement {
    pub(crate) fn new(
        keyword: QName,
        argument: Option<String>,
        reference: StatementSourceReference,
        substatements: Vec<Arc<DeclaredStatement>>,
    ) -> Self {
        Self {
            keyword,
            argument,
            reference,
            substatements,
        }
    }

    pub fn keyword(&self) -> &QName {
        &self.keyword
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    pub fn reference(&self) -> &StatementSourceReference {
        &self.reference
    }

    pub fn substatements(&self) -> &[Arc<DeclaredStatement>] {
        &self.substatements
    }

    /// First substatement with the built-in keyword `keyword`.
    pub fn find_first(&self, keyword: &str) -> Option<&Arc<DeclaredStatement>> {
        self.substatements
            .iter()
            .find(|s| s.keyword.is_builtin() && s.keyword.local_name() == keyword)
    }
}
