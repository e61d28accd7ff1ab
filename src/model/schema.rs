//! The result of a reactor run: the effective forest and assembled modules.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{ModuleNamespace, Revision, SourceIdentifier};
use crate::reactor::{ContextArena, ContextId};
use crate::source::{DependencyInfo, ModuleImport};

use super::build::StatementModel;
use super::effective::EffectiveStatement;
use super::error::EffectiveBuildError;

/// One linked source handed over by the reactor.
#[derive(Debug, Clone)]
pub(crate) struct ModelSource {
    pub dependency: DependencyInfo,
    pub namespace: ModuleNamespace,
    pub root: ContextId,
    /// Batch indices of the submodules this source includes.
    pub includes: Vec<usize>,
}

/// Submodules included by `source`, directly or through other submodules,
/// in first-include order.
fn included(sources: &[ModelSource], source: &ModelSource) -> Vec<usize> {
    let mut seen = FxHashSet::default();
    let mut order = Vec::new();
    let mut stack: Vec<usize> = source.includes.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        if !seen.insert(index) {
            continue;
        }
        order.push(index);
        stack.extend(sources[index].includes.iter().rev().copied());
    }
    order
}

/// A submodule as assembled into its module.
#[derive(Debug, Clone)]
pub struct Submodule {
    pub identifier: SourceIdentifier,
    pub name: SmolStr,
    pub revision: Option<Revision>,
    /// Name of the module named by `belongs-to`.
    pub belongs_to: SmolStr,
    pub root: Arc<EffectiveStatement>,
}

/// A module with its included submodules.
#[derive(Debug, Clone)]
pub struct Module {
    pub identifier: SourceIdentifier,
    pub name: SmolStr,
    pub namespace: ModuleNamespace,
    pub prefix: SmolStr,
    pub revision: Option<Revision>,
    pub imports: IndexSet<ModuleImport>,
    pub submodules: Vec<Submodule>,
    /// The module statement, with included submodule bodies assembled in.
    pub root: Arc<EffectiveStatement>,
}

/// The effective statement forest of one batch.
///
/// Holds the only strong reference to the statement memo tables; lazily
/// built parts of an [`EffectiveStatement`] are available while the model
/// is alive.
#[derive(Debug)]
pub struct EffectiveModel {
    _inner: Arc<StatementModel>,
    forest: IndexMap<SourceIdentifier, Arc<EffectiveStatement>>,
    modules: Vec<Module>,
}

impl EffectiveModel {
    pub(crate) fn build(
        arena: ContextArena,
        sources: Vec<ModelSource>,
        pruned: FxHashSet<ContextId>,
        parallel: bool,
    ) -> Result<Self, EffectiveBuildError> {
        let roots: Vec<ContextId> = sources.iter().map(|s| s.root).collect();
        let inner = Arc::new(StatementModel::new(arena, &roots, pruned));

        let built: Vec<Arc<EffectiveStatement>> = if parallel {
            roots
                .par_iter()
                .map(|root| inner.effective(*root))
                .collect::<Result<_, _>>()?
        } else {
            roots
                .iter()
                .map(|root| inner.effective(*root))
                .collect::<Result<_, _>>()?
        };

        let forest: IndexMap<SourceIdentifier, Arc<EffectiveStatement>> = sources
            .iter()
            .zip(&built)
            .map(|(source, root)| (source.dependency.source_identifier(), root.clone()))
            .collect();

        let modules = sources
            .iter()
            .zip(&built)
            .filter(|(source, _)| !source.dependency.is_submodule())
            .map(|(source, root)| {
                let submodules = included(&sources, source)
                    .into_iter()
                    .map(|index| {
                        let submodule = &sources[index];
                        Submodule {
                            identifier: submodule.dependency.source_identifier(),
                            name: submodule.dependency.name.clone(),
                            revision: submodule.dependency.revision.clone(),
                            belongs_to: submodule
                                .dependency
                                .belongs_to
                                .as_ref()
                                .map(|b| b.name.clone())
                                .unwrap_or_default(),
                            root: built[index].clone(),
                        }
                    })
                    .collect();
                Module {
                    identifier: source.dependency.source_identifier(),
                    name: source.dependency.name.clone(),
                    namespace: source.namespace.clone(),
                    prefix: source.dependency.prefix.clone(),
                    revision: source.dependency.revision.clone(),
                    imports: source.dependency.imports.clone(),
                    submodules,
                    root: root.clone(),
                }
            })
            .collect();

        tracing::debug!("built effective model: {} source(s)", forest.len());
        Ok(Self {
            _inner: inner,
            forest,
            modules,
        })
    }

    /// Root statements keyed by source, modules and submodules alike.
    pub fn forest(&self) -> &IndexMap<SourceIdentifier, Arc<EffectiveStatement>> {
        &self.forest
    }

    pub fn get(&self, identifier: &SourceIdentifier) -> Option<&Arc<EffectiveStatement>> {
        self.forest.get(identifier)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// The latest revision of the module named `name`.
    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.modules
            .iter()
            .filter(|m| m.name == name)
            .max_by(|a, b| a.revision.cmp(&b.revision))
    }

    pub fn find_module_by_namespace(&self, namespace: &str) -> Option<&Module> {
        self.modules
            .iter()
            .filter(|m| m.namespace.as_ref() == namespace)
            .max_by(|a, b| a.revision.cmp(&b.revision))
    }
}
