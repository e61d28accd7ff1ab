use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use crate::base::{ModuleNamespace, QName, StatementSourceReference};
use crate::reactor::{ContextId, CopyKind};

use super::build::StatementModel;
use super::declared::DeclaredStatement;
use super::error::{ContextIdentity, EffectiveBuildError};

/// The resolved view of one statement context.
///
/// Extension (unknown) substatements are not part of [`substatements`]:
/// an extension may use itself in its own definition, so they are built on
/// the first call to [`unknown_substatements`] and cached.
///
/// [`substatements`]: EffectiveStatement::substatements
/// [`unknown_substatements`]: EffectiveStatement::unknown_substatements
pub struct EffectiveStatement {
    context: ContextId,
    keyword: QName,
    argument: Option<String>,
    namespace: ModuleNamespace,
    reference: StatementSourceReference,
    declared: Arc<DeclaredStatement>,
    copy_origin: Option<CopyKind>,
    substatements: Vec<Arc<EffectiveStatement>>,
    unknown: OnceLock<Result<Vec<Arc<EffectiveStatement>>, EffectiveBuildError>>,
    model: Weak<StatementModel>,
}

impl EffectiveStatement {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        context: ContextId,
        keyword: QName,
        argument: Option<String>,
        namespace: ModuleNamespace,
        reference: StatementSourceReference,
        declared: Arc<DeclaredStatement>,
        copy_origin: Option<CopyKind>,
        substatements: Vec<Arc<EffectiveStatement>>,
        model: Weak<StatementModel>,
    ) -> Self {
        Self {
            context,
            keyword,
            argument,
            namespace,
            reference,
            declared,
            copy_origin,
            substatements,
            unknown: OnceLock::new(),
            model,
        }
    }

    pub fn keyword(&self) -> &QName {
        &self.keyword
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Namespace of the module this statement is effective in. Copies take
    /// the namespace of the module they were copied into.
    pub fn namespace(&self) -> &ModuleNamespace {
        &self.namespace
    }

    pub fn reference(&self) -> &StatementSourceReference {
        &self.reference
    }

    /// The declared statement, shared with every copy of the same original.
    pub fn declared(&self) -> &Arc<DeclaredStatement> {
        &self.declared
    }

    /// How this statement got here, when it is a copy.
    pub fn copy_origin(&self) -> Option<CopyKind> {
        self.copy_origin
    }

    /// Substatements, extension statements excluded.
    pub fn substatements(&self) -> &[Arc<EffectiveStatement>] {
        &self.substatements
    }

    /// First substatement with the built-in keyword `keyword`.
    pub fn find_first<'a>(&'a self, keyword: &'a str) -> Option<&'a Arc<EffectiveStatement>> {
        self.find_all(keyword).next()
    }

    pub fn find_all<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Arc<EffectiveStatement>> + 'a {
        self.substatements
            .iter()
            .filter(move |s| s.keyword.is_builtin() && s.keyword.local_name() == keyword)
    }

    /// Extension statements below this one, built on first request.
    pub fn unknown_substatements(&self) -> Result<Vec<Arc<EffectiveStatement>>, EffectiveBuildError> {
        let model = self.model()?;
        self.unknown
            .get_or_init(|| model.unknown_children(self.context))
            .clone()
    }

    /// Known substatements followed by extension statements.
    pub fn all_substatements(&self) -> Result<Vec<Arc<EffectiveStatement>>, EffectiveBuildError> {
        let mut all = self.substatements.clone();
        all.extend(self.unknown_substatements()?);
        Ok(all)
    }

    /// For an extension statement, the `extension` statement defining it.
    pub fn extension_definition(&self) -> Result<Option<Arc<EffectiveStatement>>, EffectiveBuildError> {
        if self.keyword.is_builtin() {
            return Ok(None);
        }
        self.model()?.extension_definition(&self.keyword)
    }

    fn model(&self) -> Result<Arc<StatementModel>, EffectiveBuildError> {
        self.model.upgrade().ok_or_else(|| EffectiveBuildError::ModelDropped {
            context: self.identity(),
        })
    }

    fn identity(&self) -> ContextIdentity {
        ContextIdentity {
            keyword: self.keyword.clone(),
            argument: self.argument.clone(),
            reference: self.reference.clone(),
        }
    }
}

impl fmt::Debug for EffectiveStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveStatement")
            .field("keyword", &self.keyword)
            .field("argument", &self.argument)
            .field("copy_origin", &self.copy_origin)
            .field("substatements", &self.substatements)
            .finish_non_exhaustive()
    }
}
