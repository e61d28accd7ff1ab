//! Arena of statement contexts.
//!
//! Contexts refer to each other by [`ContextId`]. A context created by a
//! copy operation records its canonical original directly, never another
//! copy, so `original` lookups are a single index.

use std::fmt;
use std::sync::Arc;

use crate::base::{ModuleNamespace, QName, StatementSourceReference};
use crate::model::{ContextIdentity, DeclarationError};
use crate::stmt::{DefinitionKind, StatementDefinition, StatementDefinitionRegistry};

use super::builder::StatementFragment;

/// Stable index of a context in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u32);

impl ContextId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a context exists as a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyKind {
    /// Instantiated from a grouping at a `uses` site.
    AddedByUses,
    /// Placed into a target node by an `augment`.
    Augmentation,
    /// A submodule statement assembled into its module.
    Include,
    /// Added or replaced by a `deviate` statement.
    Deviation,
    /// Added or replaced by a `refine` statement.
    Refinement,
}

/// One statement node of the build.
#[derive(Debug, Clone)]
pub struct StatementContext {
    source: usize,
    keyword: QName,
    definition: Arc<StatementDefinition>,
    argument: Option<String>,
    reference: StatementSourceReference,
    parent: Option<ContextId>,
    declared_children: Vec<ContextId>,
    effective_children: Vec<ContextId>,
    original: Option<ContextId>,
    copy_kind: Option<CopyKind>,
    namespace: ModuleNamespace,
}

impl StatementContext {
    /// Index of the source this statement was written in.
    pub fn source_index(&self) -> usize {
        self.source
    }

    pub fn keyword(&self) -> &QName {
        &self.keyword
    }

    /// True for a built-in statement with this local name.
    pub fn is(&self, keyword: &str) -> bool {
        self.keyword.is_builtin() && self.keyword.local_name() == keyword
    }

    /// The keyword statements are matched by when one replaces another. A
    /// `type` rewritten to its type name still matches as `type`.
    pub fn match_keyword(&self) -> QName {
        match self.definition.kind() {
            DefinitionKind::TypeBody => QName::yin("type"),
            _ => self.keyword.clone(),
        }
    }

    pub fn definition(&self) -> &Arc<StatementDefinition> {
        &self.definition
    }

    pub fn is_unknown(&self) -> bool {
        self.definition.kind() == DefinitionKind::Extension
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    pub fn reference(&self) -> &StatementSourceReference {
        &self.reference
    }

    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    /// Children as written in the source. Empty for copies.
    pub fn declared_children(&self) -> &[ContextId] {
        &self.declared_children
    }

    /// Children after inference: declared children plus whatever uses,
    /// include, augment and deviation processing added or removed.
    pub fn effective_children(&self) -> &[ContextId] {
        &self.effective_children
    }

    /// The canonical context this one was copied from.
    pub fn original(&self) -> Option<ContextId> {
        self.original
    }

    pub fn copy_kind(&self) -> Option<CopyKind> {
        self.copy_kind
    }

    /// Namespace of the module this statement belongs to.
    pub fn namespace(&self) -> &ModuleNamespace {
        &self.namespace
    }

    pub fn identity(&self) -> ContextIdentity {
        ContextIdentity {
            keyword: self.keyword.clone(),
            argument: self.argument.clone(),
            reference: self.reference.clone(),
        }
    }
}

/// Owner of every context in a build session.
#[derive(Debug, Default)]
pub struct ContextArena {
    contexts: Vec<StatementContext>,
    frozen: bool,
}

impl ContextArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn get(&self, id: ContextId) -> &StatementContext {
        &self.contexts[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = ContextId> + use<> {
        (0..self.contexts.len() as u32).map(ContextId)
    }

    /// The canonical (non-copy) context behind `id`.
    pub fn canonical(&self, id: ContextId) -> ContextId {
        self.get(id).original.unwrap_or(id)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Disallow any further structural change.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    fn check_mutable(&self, id: ContextId) -> Result<(), DeclarationError> {
        if self.frozen {
            return Err(DeclarationError::Frozen {
                context: self.get(id).identity(),
            });
        }
        Ok(())
    }

    /// Place a source's statement tree into the arena and return its root.
    pub(crate) fn insert_fragment(
        &mut self,
        fragment: &StatementFragment,
        root: usize,
        source: usize,
        namespace: &ModuleNamespace,
        definitions: &StatementDefinitionRegistry,
    ) -> ContextId {
        self.insert_node(fragment, root, None, source, namespace, definitions)
    }

    fn insert_node(
        &mut self,
        fragment: &StatementFragment,
        index: usize,
        parent: Option<ContextId>,
        source: usize,
        namespace: &ModuleNamespace,
        definitions: &StatementDefinitionRegistry,
    ) -> ContextId {
        let node = fragment.node(index);
        let id = self.push(StatementContext {
            source,
            keyword: node.keyword.clone(),
            definition: definitions.resolve(&node.keyword),
            argument: node.argument.clone(),
            reference: node.reference.clone(),
            parent,
            declared_children: Vec::new(),
            effective_children: Vec::new(),
            original: None,
            copy_kind: None,
            namespace: namespace.clone(),
        });
        let children: Vec<ContextId> = node
            .children
            .iter()
            .map(|child| self.insert_node(fragment, *child, Some(id), source, namespace, definitions))
            .collect();
        let context = &mut self.contexts[id.index()];
        context.declared_children = children.clone();
        context.effective_children = children;
        id
    }

    fn push(&mut self, context: StatementContext) -> ContextId {
        let id = ContextId(self.contexts.len() as u32);
        self.contexts.push(context);
        id
    }

    /// Copy `from` and its effective subtree under `parent`. The copies
    /// belong to `namespace` and record the canonical original of each
    /// copied node. The new root is not attached to `parent`'s children.
    pub fn copy_subtree(
        &mut self,
        from: ContextId,
        parent: ContextId,
        kind: CopyKind,
        namespace: &ModuleNamespace,
    ) -> Result<ContextId, DeclarationError> {
        self.check_mutable(parent)?;
        Ok(self.copy_node(from, parent, kind, namespace))
    }

    fn copy_node(&mut self, from: ContextId, parent: ContextId, kind: CopyKind, namespace: &ModuleNamespace) -> ContextId {
        let source = self.get(from);
        let copy = StatementContext {
            source: source.source,
            keyword: source.keyword.clone(),
            definition: source.definition.clone(),
            argument: source.argument.clone(),
            reference: source.reference.clone(),
            parent: Some(parent),
            declared_children: Vec::new(),
            effective_children: Vec::new(),
            original: Some(self.canonical(from)),
            copy_kind: Some(kind),
            namespace: namespace.clone(),
        };
        let children = source.effective_children.clone();
        let id = self.push(copy);
        let copies: Vec<ContextId> = children
            .into_iter()
            .map(|child| self.copy_node(child, id, kind, namespace))
            .collect();
        self.contexts[id.index()].effective_children = copies;
        id
    }

    pub fn add_effective_child(&mut self, parent: ContextId, child: ContextId) -> Result<(), DeclarationError> {
        self.check_mutable(parent)?;
        self.contexts[parent.index()].effective_children.push(child);
        Ok(())
    }

    pub fn remove_effective_child(&mut self, parent: ContextId, child: ContextId) -> Result<(), DeclarationError> {
        self.check_mutable(parent)?;
        self.contexts[parent.index()].effective_children.retain(|c| *c != child);
        Ok(())
    }

    /// Remove the effective children of `parent` matching `predicate`.
    pub fn remove_effective_children(
        &mut self,
        parent: ContextId,
        predicate: impl Fn(&StatementContext) -> bool,
    ) -> Result<(), DeclarationError> {
        self.check_mutable(parent)?;
        let children = std::mem::take(&mut self.contexts[parent.index()].effective_children);
        let kept = children
            .into_iter()
            .filter(|child| !predicate(self.get(*child)))
            .collect();
        self.contexts[parent.index()].effective_children = kept;
        Ok(())
    }

    /// Effective descendants of `id` in depth-first order, `id` excluded.
    pub fn effective_descendants(&self, id: ContextId) -> Vec<ContextId> {
        let mut out = Vec::new();
        let mut stack: Vec<ContextId> = self.get(id).effective_children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.get(next).effective_children.iter().rev().copied());
        }
        out
    }

    /// Declared descendants of `id` in depth-first order, `id` excluded.
    pub fn declared_descendants(&self, id: ContextId) -> Vec<ContextId> {
        let mut out = Vec::new();
        let mut stack: Vec<ContextId> = self.get(id).declared_children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.get(next).declared_children.iter().rev().copied());
        }
        out
    }

    /// First effective child of `id` that is the built-in `keyword`.
    pub fn child(&self, id: ContextId, keyword: &str) -> Option<ContextId> {
        self.get(id)
            .effective_children
            .iter()
            .copied()
            .find(|child| self.get(*child).is(keyword))
    }

    /// Argument of the first effective `keyword` child of `id`.
    pub fn child_argument(&self, id: ContextId, keyword: &str) -> Option<&str> {
        self.child(id, keyword).and_then(|child| self.get(child).argument())
    }

    /// The outermost ancestor of `id` (its module or submodule statement).
    pub fn root_of(&self, mut id: ContextId) -> ContextId {
        while let Some(parent) = self.get(id).parent {
            id = parent;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactor::builder::ContextTreeBuilder;
    use crate::stmt::{StatementEmitter, StatementWriter};

    fn arena_with(text: &str) -> (ContextArena, ContextId) {
        let parse = crate::parser::parse(text);
        let file = <crate::parser::SourceFile as crate::parser::AstNode>::cast(parse.syntax()).unwrap();
        let definitions = StatementDefinitionRegistry::builtins();
        let mut builder = ContextTreeBuilder::new();
        StatementEmitter::new(&definitions, None).emit_yang(
            &Arc::from("t.yang"),
            &file,
            &crate::base::LineIndex::new(text),
            &mut builder as &mut dyn StatementWriter,
        );
        let fragment = builder.finish().unwrap();
        let mut arena = ContextArena::new();
        let root = arena.insert_fragment(&fragment, fragment.root().unwrap(), 0, &Arc::from("urn:t"), &definitions);
        (arena, root)
    }

    #[test]
    fn test_copy_of_copy_points_at_canonical() {
        let (mut arena, root) = arena_with("module t { grouping g { leaf l; } container a; container b; }");
        let grouping = arena.child(root, "grouping").unwrap();
        let leaf = arena.child(grouping, "leaf").unwrap();
        let containers: Vec<_> = arena.get(root).effective_children().iter().copied().skip(1).collect();
        let ns: ModuleNamespace = Arc::from("urn:t");

        let first = arena.copy_subtree(leaf, containers[0], CopyKind::AddedByUses, &ns).unwrap();
        let second = arena.copy_subtree(first, containers[1], CopyKind::AddedByUses, &ns).unwrap();
        assert_eq!(arena.get(first).original(), Some(leaf));
        assert_eq!(arena.get(second).original(), Some(leaf));
        assert_eq!(arena.canonical(second), leaf);
        assert_eq!(arena.get(second).parent(), Some(containers[1]));
    }

    #[test]
    fn test_frozen_arena_rejects_changes() {
        let (mut arena, root) = arena_with("module t { leaf l; }");
        let leaf = arena.child(root, "leaf").unwrap();
        arena.freeze();
        let err = arena.copy_subtree(leaf, root, CopyKind::Augmentation, &Arc::from("urn:t"));
        assert!(matches!(err, Err(DeclarationError::Frozen { .. })));
        assert!(arena.add_effective_child(root, leaf).is_err());
    }

    #[test]
    fn test_descendants_and_root() {
        let (arena, root) = arena_with("module t { container c { leaf a; leaf b; } }");
        let descendants = arena.effective_descendants(root);
        let names: Vec<_> = descendants.iter().map(|id| arena.get(*id).argument().unwrap_or("")).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(arena.root_of(descendants[2]), root);
        assert_eq!(arena.declared_descendants(root).len(), 3);
    }
}
