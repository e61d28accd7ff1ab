//! Memo tables behind the declared and effective views of a frozen arena.
//!
//! Declared statements are built once per canonical context and shared by
//! every copy. Effective statements are built once per context. Both tables
//! are plain `OnceLock` slots indexed by [`ContextId`], so concurrent
//! builders of the same slot agree on one instance.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::QName;
use crate::reactor::{ContextArena, ContextId};

use super::declared::DeclaredStatement;
use super::effective::EffectiveStatement;
use super::error::{DeclarationError, EffectiveBuildError};

type DeclaredSlot = OnceLock<Result<Arc<DeclaredStatement>, DeclarationError>>;
type EffectiveSlot = OnceLock<Result<Arc<EffectiveStatement>, EffectiveBuildError>>;

pub(crate) struct StatementModel {
    arena: ContextArena,
    pruned: FxHashSet<ContextId>,
    extensions: FxHashMap<QName, ContextId>,
    declared: Vec<DeclaredSlot>,
    effective: Vec<EffectiveSlot>,
}

impl StatementModel {
    /// Wrap a frozen arena. Contexts in `pruned` and their subtrees are left
    /// out of every effective statement.
    pub(crate) fn new(arena: ContextArena, roots: &[ContextId], pruned: FxHashSet<ContextId>) -> Self {
        let mut extensions = FxHashMap::default();
        for root in roots {
            for child in arena.get(*root).effective_children() {
                let context = arena.get(*child);
                if !context.is("extension") {
                    continue;
                }
                if let Some(name) = context.argument() {
                    extensions
                        .entry(QName::new(context.namespace().as_ref(), name))
                        .or_insert_with(|| arena.canonical(*child));
                }
            }
        }
        let len = arena.len();
        Self {
            arena,
            pruned,
            extensions,
            declared: (0..len).map(|_| OnceLock::new()).collect(),
            effective: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    fn is_pruned(&self, id: ContextId) -> bool {
        self.pruned.contains(&id)
    }

    /// The declared statement of `id`'s canonical context.
    pub(crate) fn declared(&self, id: ContextId) -> Result<Arc<DeclaredStatement>, DeclarationError> {
        let canonical = self.arena.canonical(id);
        self.declared[canonical.index()]
            .get_or_init(|| self.build_declared(canonical))
            .clone()
    }

    fn build_declared(&self, id: ContextId) -> Result<Arc<DeclaredStatement>, DeclarationError> {
        let context = self.arena.get(id);
        match (context.definition().has_argument(), context.argument()) {
            (true, None) => {
                return Err(DeclarationError::MissingArgument {
                    context: context.identity(),
                });
            }
            (false, Some(_)) => {
                return Err(DeclarationError::UnexpectedArgument {
                    context: context.identity(),
                });
            }
            _ => {}
        }
        let substatements = context
            .declared_children()
            .iter()
            .map(|child| self.declared(*child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(DeclaredStatement::new(
            context.keyword().clone(),
            context.argument().map(str::to_string),
            context.reference().clone(),
            substatements,
        )))
    }

    pub(crate) fn effective(self: &Arc<Self>, id: ContextId) -> Result<Arc<EffectiveStatement>, EffectiveBuildError> {
        self.effective[id.index()]
            .get_or_init(|| self.build_effective(id))
            .clone()
    }

    fn build_effective(self: &Arc<Self>, id: ContextId) -> Result<Arc<EffectiveStatement>, EffectiveBuildError> {
        let context = self.arena.get(id);
        let declared = self.declared(id).map_err(|cause| EffectiveBuildError::Declaration {
            context: context.identity(),
            cause: Arc::new(cause),
        })?;
        let substatements = self.children(id, false)?;
        Ok(Arc::new(EffectiveStatement::new(
            id,
            context.keyword().clone(),
            context.argument().map(str::to_string),
            context.namespace().clone(),
            context.reference().clone(),
            declared,
            context.copy_kind(),
            substatements,
            Arc::downgrade(self),
        )))
    }

    /// Effective extension statements directly below `id`.
    pub(crate) fn unknown_children(
        self: &Arc<Self>,
        id: ContextId,
    ) -> Result<Vec<Arc<EffectiveStatement>>, EffectiveBuildError> {
        self.children(id, true)
    }

    fn children(
        self: &Arc<Self>,
        id: ContextId,
        unknown: bool,
    ) -> Result<Vec<Arc<EffectiveStatement>>, EffectiveBuildError> {
        self.arena
            .get(id)
            .effective_children()
            .iter()
            .copied()
            .filter(|child| !self.is_pruned(*child) && self.arena.get(*child).is_unknown() == unknown)
            .map(|child| self.effective(child))
            .collect()
    }

    /// The `extension` statement defining the extension keyword `keyword`.
    pub(crate) fn extension_definition(
        self: &Arc<Self>,
        keyword: &QName,
    ) -> Result<Option<Arc<EffectiveStatement>>, EffectiveBuildError> {
        match self.extensions.get(keyword) {
            Some(id) => self.effective(*id).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for StatementModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementModel")
            .field("contexts", &self.arena.len())
            .field("pruned", &self.pruned.len())
            .finish_non_exhaustive()
    }
}
