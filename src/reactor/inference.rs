//! Cross-reference inference run at the end of FULL_DECLARATION, once the
//! statement trees of every source are in the arena.
//!
//! Order matters:
//! 1. `uses` expansion (nested uses inside groupings first), with `refine`
//!    and uses-relative `augment`,
//! 2. include assembly into each module,
//! 3. top-level `augment`, repeated until augments of augmented nodes settle,
//! 4. `deviation`,
//! 5. `if-feature` references are checked.

use rustc_hash::FxHashSet;

use crate::base::{ModuleNamespace, QName};

use super::config::ReactorConfig;
use super::context::{ContextArena, ContextId, CopyKind};
use super::error::ReactorError;
use super::linkage::SourceLinks;

/// Statements that address schema nodes in paths.
const SCHEMA_NODES: &[&str] = &[
    "container",
    "leaf",
    "leaf-list",
    "list",
    "choice",
    "case",
    "anyxml",
    "rpc",
    "notification",
];

/// Operation bodies, addressed by keyword rather than argument.
const OPERATION_BODIES: &[&str] = &["input", "output"];

/// Submodule statements assembled into the including module.
const INCLUDED_STATEMENTS: &[&str] = &[
    "container",
    "leaf",
    "leaf-list",
    "list",
    "choice",
    "anyxml",
    "uses",
    "grouping",
    "typedef",
    "identity",
    "feature",
    "extension",
    "rpc",
    "notification",
];

/// Grouping statements that stay with the grouping.
const GROUPING_LOCAL: &[&str] = &["description", "reference", "status", "typedef", "grouping"];

/// Augment statements that describe the augment itself.
const AUGMENT_LOCAL: &[&str] = &["description", "reference", "status", "when", "if-feature"];

pub(crate) struct Inference<'a> {
    arena: &'a mut ContextArena,
    roots: &'a [ContextId],
    links: &'a [SourceLinks],
    config: &'a ReactorConfig,
}

impl<'a> Inference<'a> {
    pub(crate) fn new(
        arena: &'a mut ContextArena,
        roots: &'a [ContextId],
        links: &'a [SourceLinks],
        config: &'a ReactorConfig,
    ) -> Self {
        Self {
            arena,
            roots,
            links,
            config,
        }
    }

    pub(crate) fn run(mut self) -> Result<(), ReactorError> {
        self.expand_all_uses()?;
        self.assemble_includes()?;
        self.apply_augments()?;
        self.apply_deviations()?;
        self.check_features()
    }

    // ========================================================================
    // uses
    // ========================================================================

    fn expand_all_uses(&mut self) -> Result<(), ReactorError> {
        let uses: Vec<ContextId> = self
            .roots
            .iter()
            .flat_map(|root| self.arena.declared_descendants(*root))
            .filter(|id| self.arena.get(*id).is("uses"))
            .collect();
        let mut expansion = UsesExpansion::default();
        for id in uses {
            self.expand_uses(id, &mut expansion)?;
        }
        Ok(())
    }

    /// Expand every canonical `uses` below `id`.
    fn expand_nested_uses(&mut self, id: ContextId, expansion: &mut UsesExpansion) -> Result<(), ReactorError> {
        let nested: Vec<ContextId> = self
            .arena
            .declared_descendants(id)
            .into_iter()
            .filter(|d| self.arena.get(*d).is("uses"))
            .collect();
        for uses in nested {
            self.expand_uses(uses, expansion)?;
        }
        Ok(())
    }

    fn expand_uses(&mut self, uses: ContextId, expansion: &mut UsesExpansion) -> Result<(), ReactorError> {
        if expansion.done.contains(&uses) {
            return Ok(());
        }
        if !expansion.in_progress.insert(uses) {
            return Err(self.error(uses, "recursive use of grouping"));
        }

        let grouping = self.find_grouping(uses)?;
        self.expand_nested_uses(grouping, expansion)?;
        self.expand_nested_uses(uses, expansion)?;

        let Some(parent) = self.arena.get(uses).parent() else {
            return Err(self.error(uses, "uses statement has no parent"));
        };
        let namespace = self.arena.get(parent).namespace().clone();
        tracing::trace!(
            "expanding uses '{}' into {}",
            self.arena.get(uses).argument().unwrap_or_default(),
            self.arena.get(parent).reference()
        );

        let body: Vec<ContextId> = self
            .arena
            .get(grouping)
            .effective_children()
            .iter()
            .copied()
            .filter(|child| !self.is_any(*child, GROUPING_LOCAL))
            .collect();
        let mut copies = Vec::with_capacity(body.len());
        for child in body {
            let copy = self
                .arena
                .copy_subtree(child, parent, CopyKind::AddedByUses, &namespace)?;
            self.arena.add_effective_child(parent, copy)?;
            copies.push(copy);
        }

        let declared: Vec<ContextId> = self.arena.get(uses).declared_children().to_vec();
        for statement in declared {
            if self.arena.get(statement).is("refine") {
                let target = self.resolve_descendant(statement, &copies)?;
                self.apply_refine(statement, target)?;
            } else if self.arena.get(statement).is("augment") {
                let target = self.resolve_descendant(statement, &copies)?;
                self.apply_augment(statement, target)?;
            }
        }

        expansion.in_progress.remove(&uses);
        expansion.done.insert(uses);
        Ok(())
    }

    /// The grouping a `uses` names: lexical scope first, then the module
    /// and its submodules, or the module bound to the prefix.
    fn find_grouping(&self, uses: ContextId) -> Result<ContextId, ReactorError> {
        let context = self.arena.get(uses);
        let Some(argument) = context.argument() else {
            return Err(self.error(uses, "uses statement has no grouping name"));
        };
        let source = context.source_index();
        let (module, name) = match argument.split_once(':') {
            Some((prefix, name)) => match self.links[source].prefix_modules.get(prefix) {
                Some(module) => (*module, name),
                None => return Err(self.error(uses, format!("unknown prefix '{prefix}' in grouping reference"))),
            },
            None => (self.links[source].owner(source), argument),
        };

        if module == self.links[source].owner(source) {
            let mut scope = context.parent();
            while let Some(ancestor) = scope {
                if let Some(found) = self.find_declared(ancestor, "grouping", name) {
                    return Ok(found);
                }
                scope = self.arena.get(ancestor).parent();
            }
        }
        self.module_scope(module)
            .into_iter()
            .find_map(|root| self.find_declared(root, "grouping", name))
            .ok_or_else(|| self.error(uses, format!("grouping '{argument}' not found")))
    }

    fn find_declared(&self, parent: ContextId, keyword: &str, name: &str) -> Option<ContextId> {
        self.arena
            .get(parent)
            .declared_children()
            .iter()
            .copied()
            .find(|child| {
                let child = self.arena.get(*child);
                child.is(keyword) && child.argument() == Some(name)
            })
    }

    /// Roots of a module and every submodule it includes, transitively.
    fn module_scope(&self, module: usize) -> Vec<ContextId> {
        let mut sources = vec![module];
        let mut index = 0;
        while index < sources.len() {
            for include in &self.links[sources[index]].includes {
                if !sources.contains(include) {
                    sources.push(*include);
                }
            }
            index += 1;
        }
        sources.into_iter().map(|source| self.roots[source]).collect()
    }

    fn apply_refine(&mut self, refine: ContextId, target: ContextId) -> Result<(), ReactorError> {
        let namespace = self.arena.get(target).namespace().clone();
        let statements: Vec<ContextId> = self.arena.get(refine).declared_children().to_vec();
        for statement in statements {
            let keyword = self.arena.get(statement).match_keyword();
            if !(keyword == QName::yin("must") || keyword == QName::yin("if-feature")) {
                self.arena
                    .remove_effective_children(target, |child| child.match_keyword() == keyword)?;
            }
            self.add_copy(statement, target, CopyKind::Refinement, &namespace)?;
        }
        tracing::trace!("refined {}", self.arena.get(target).reference());
        Ok(())
    }

    /// Resolve a descendant schema node path (`a/b`) starting at `roots`.
    fn resolve_descendant(&self, statement: ContextId, roots: &[ContextId]) -> Result<ContextId, ReactorError> {
        let path = self.arena.get(statement).argument().unwrap_or_default();
        let mut steps = path.split('/').filter(|s| !s.is_empty());
        let unresolved = || self.error(statement, format!("target node '{path}' not found"));
        let first = steps.next().ok_or_else(unresolved)?;
        let (_, name) = split_prefix(first);
        let mut current = roots
            .iter()
            .copied()
            .find(|candidate| self.matches_step(*candidate, name, None))
            .ok_or_else(unresolved)?;
        for step in steps {
            let (_, name) = split_prefix(step);
            current = self.child_node(current, name, None).ok_or_else(unresolved)?;
        }
        Ok(current)
    }

    // ========================================================================
    // include
    // ========================================================================

    fn assemble_includes(&mut self) -> Result<(), ReactorError> {
        for (module, links) in self.links.iter().enumerate() {
            if links.parent.is_some() {
                continue;
            }
            let root = self.roots[module];
            let namespace = links.namespace.clone();
            for submodule_root in self.module_scope(module).into_iter().skip(1) {
                let body: Vec<ContextId> = self
                    .arena
                    .get(submodule_root)
                    .effective_children()
                    .iter()
                    .copied()
                    .filter(|child| self.is_any(*child, INCLUDED_STATEMENTS))
                    .collect();
                for statement in body {
                    self.add_copy(statement, root, CopyKind::Include, &namespace)?;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // augment
    // ========================================================================

    fn apply_augments(&mut self) -> Result<(), ReactorError> {
        let mut pending: Vec<ContextId> = self.top_level("augment");
        let mut round = 0;
        while !pending.is_empty() && round < self.config.max_inference_rounds {
            round += 1;
            let before = pending.len();
            let mut unresolved = Vec::new();
            for augment in std::mem::take(&mut pending) {
                match self.resolve_absolute(augment)? {
                    Some(target) => self.apply_augment(augment, target)?,
                    None => unresolved.push(augment),
                }
            }
            let progress = unresolved.len() < before;
            pending = unresolved;
            if !progress {
                break;
            }
        }
        tracing::debug!("augments settled after {} round(s)", round);

        match pending.first() {
            Some(augment) => {
                let path = self.arena.get(*augment).argument().unwrap_or_default();
                Err(self.error(*augment, format!("augment target '{path}' not found")))
            }
            None => Ok(()),
        }
    }

    fn apply_augment(&mut self, augment: ContextId, target: ContextId) -> Result<(), ReactorError> {
        let namespace = self.arena.get(augment).namespace().clone();
        let body: Vec<ContextId> = self
            .arena
            .get(augment)
            .effective_children()
            .iter()
            .copied()
            .filter(|child| !self.is_any(*child, AUGMENT_LOCAL))
            .collect();
        for statement in body {
            self.add_copy(statement, target, CopyKind::Augmentation, &namespace)?;
        }
        tracing::trace!(
            "augmented {} from {}",
            self.arena.get(target).reference(),
            self.arena.get(augment).reference()
        );
        Ok(())
    }

    // ========================================================================
    // deviation
    // ========================================================================

    fn apply_deviations(&mut self) -> Result<(), ReactorError> {
        for deviation in self.top_level("deviation") {
            let Some(target) = self.resolve_absolute(deviation)? else {
                let path = self.arena.get(deviation).argument().unwrap_or_default();
                return Err(self.error(deviation, format!("deviation target '{path}' not found")));
            };
            let deviates: Vec<ContextId> = self
                .arena
                .get(deviation)
                .declared_children()
                .iter()
                .copied()
                .filter(|child| self.arena.get(*child).is("deviate"))
                .collect();
            for deviate in deviates {
                self.apply_deviate(deviate, target)?;
            }
        }
        Ok(())
    }

    fn apply_deviate(&mut self, deviate: ContextId, target: ContextId) -> Result<(), ReactorError> {
        let namespace = self.arena.get(target).namespace().clone();
        let statements: Vec<ContextId> = self.arena.get(deviate).declared_children().to_vec();
        let kind = self.arena.get(deviate).argument().unwrap_or_default().to_string();
        tracing::trace!("deviate {} on {}", kind, self.arena.get(target).reference());
        match kind.as_str() {
            "not-supported" => {
                if let Some(parent) = self.arena.get(target).parent() {
                    self.arena.remove_effective_child(parent, target)?;
                }
            }
            "add" => {
                for statement in statements {
                    self.add_copy(statement, target, CopyKind::Deviation, &namespace)?;
                }
            }
            "replace" => {
                for statement in statements {
                    let keyword = self.arena.get(statement).match_keyword();
                    self.arena
                        .remove_effective_children(target, |child| child.match_keyword() == keyword)?;
                    self.add_copy(statement, target, CopyKind::Deviation, &namespace)?;
                }
            }
            "delete" => {
                for statement in statements {
                    let keyword = self.arena.get(statement).match_keyword();
                    let argument = self.arena.get(statement).argument().map(str::to_string);
                    self.arena.remove_effective_children(target, |child| {
                        child.match_keyword() == keyword && child.argument() == argument.as_deref()
                    })?;
                }
            }
            other => return Err(self.error(deviate, format!("invalid deviate argument '{other}'"))),
        }
        Ok(())
    }

    // ========================================================================
    // if-feature
    // ========================================================================

    fn check_features(&self) -> Result<(), ReactorError> {
        for id in self.arena.ids() {
            let context = self.arena.get(id);
            if !context.is("if-feature") || context.original().is_some() {
                continue;
            }
            let feature = feature_name(self.arena, self.links, id)?;
            let defined = self
                .links
                .iter()
                .enumerate()
                .filter(|(_, links)| links.parent.is_none() && links.namespace.as_ref() == feature.namespace())
                .flat_map(|(module, _)| self.module_scope(module))
                .any(|root| self.find_declared(root, "feature", feature.local_name()).is_some());
            if !defined {
                return Err(self.error(id, format!("feature '{}' is not defined", feature.local_name())));
            }
        }
        Ok(())
    }

    // ========================================================================
    // helpers
    // ========================================================================

    /// Canonical statements of `keyword` directly below each root.
    fn top_level(&self, keyword: &str) -> Vec<ContextId> {
        self.roots
            .iter()
            .flat_map(|root| self.arena.get(*root).declared_children().iter().copied())
            .filter(|id| self.arena.get(*id).is(keyword))
            .collect()
    }

    fn add_copy(
        &mut self,
        statement: ContextId,
        target: ContextId,
        kind: CopyKind,
        namespace: &ModuleNamespace,
    ) -> Result<(), ReactorError> {
        let copy = self.arena.copy_subtree(statement, target, kind, namespace)?;
        self.arena.add_effective_child(target, copy)?;
        Ok(())
    }

    /// Resolve an absolute schema node path (`/p:a/p:b`). `None` when some
    /// step does not exist (yet).
    fn resolve_absolute(&self, statement: ContextId) -> Result<Option<ContextId>, ReactorError> {
        let context = self.arena.get(statement);
        let source = context.source_index();
        let path = context.argument().unwrap_or_default();
        if !path.starts_with('/') {
            return Err(self.error(statement, format!("target '{path}' is not an absolute path")));
        }

        let mut current: Option<ContextId> = None;
        for step in path.split('/').filter(|s| !s.is_empty()) {
            let (prefix, name) = split_prefix(step);
            let module = match prefix {
                Some(prefix) => match self.links[source].prefix_modules.get(prefix) {
                    Some(module) => *module,
                    None => return Err(self.error(statement, format!("unknown prefix '{prefix}' in '{path}'"))),
                },
                None => self.links[source].owner(source),
            };
            let namespace = &self.links[module].namespace;
            let parent = current.unwrap_or(self.roots[module]);
            match self.child_node(parent, name, Some(namespace)) {
                Some(next) => current = Some(next),
                None => return Ok(None),
            }
        }
        Ok(current)
    }

    fn child_node(&self, parent: ContextId, name: &str, namespace: Option<&ModuleNamespace>) -> Option<ContextId> {
        self.arena
            .get(parent)
            .effective_children()
            .iter()
            .copied()
            .find(|child| self.matches_step(*child, name, namespace))
    }

    fn matches_step(&self, id: ContextId, name: &str, namespace: Option<&ModuleNamespace>) -> bool {
        let context = self.arena.get(id);
        if namespace.is_some_and(|ns| ns != context.namespace()) {
            return false;
        }
        if OPERATION_BODIES.iter().any(|body| context.is(body)) {
            return context.keyword().local_name() == name;
        }
        self.is_any(id, SCHEMA_NODES) && context.argument() == Some(name)
    }

    fn is_any(&self, id: ContextId, keywords: &[&str]) -> bool {
        let context = self.arena.get(id);
        keywords.iter().any(|keyword| context.is(keyword))
    }

    fn error(&self, id: ContextId, message: impl Into<String>) -> ReactorError {
        ReactorError::inference(self.arena.get(id).reference(), message)
    }
}

#[derive(Debug, Default)]
struct UsesExpansion {
    in_progress: FxHashSet<ContextId>,
    done: FxHashSet<ContextId>,
}

fn split_prefix(step: &str) -> (Option<&str>, &str) {
    match step.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, step),
    }
}

/// The feature an `if-feature` statement refers to, resolved against the
/// prefixes of the source it was written in.
pub(crate) fn feature_name(
    arena: &ContextArena,
    links: &[SourceLinks],
    if_feature: ContextId,
) -> Result<QName, ReactorError> {
    let context = arena.get(if_feature);
    let links = &links[context.source_index()];
    let argument = context.argument().unwrap_or_default();
    match split_prefix(argument) {
        (Some(prefix), name) => links.prefixes.qualify(prefix, name).ok_or_else(|| {
            ReactorError::inference(context.reference(), format!("unknown prefix '{prefix}' in if-feature"))
        }),
        (None, name) => Ok(QName::new(links.namespace.as_ref(), name)),
    }
}
