//! The build session: one batch of sources driven through every phase.
//!
//! Each phase has per-source work (replaying the source through the
//! emitter with the phase's vocabulary) and a global step that needs every
//! source of the batch (linking, merging extension definitions, inference,
//! building the effective model). A phase is complete for the batch only
//! after its global step ran, and no source may start a phase before the
//! batch completed the previous one.

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::base::{ModuleNamespace, QName, StatementSourceReference};
use crate::model::{EffectiveModel, ModelSource};
use crate::source::{DependencyInfo, SchemaSource, SourceError};
use crate::stmt::{
    ArgumentDefinition, PrefixToModule, StatementDefinition, StatementDefinitionRegistry, StatementStreamSource,
};

use super::builder::{ContextTreeBuilder, StatementFragment};
use super::config::ReactorConfig;
use super::context::{ContextArena, ContextId};
use super::error::ReactorError;
use super::inference::{Inference, feature_name};
use super::linkage::{LinkageInput, SourceLinks, link};
use super::phase::ModelPhase;

/// Creates build sessions sharing one configuration.
#[derive(Debug, Clone, Default)]
pub struct StatementReactor {
    config: ReactorConfig,
}

impl StatementReactor {
    pub fn new(config: ReactorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.config
    }

    pub fn new_build(&self) -> BuildSession {
        BuildSession::new(self.config.clone())
    }
}

/// Handle of a source registered in a [`BuildSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(usize);

impl SourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

struct SourceState {
    name: Arc<str>,
    source: Arc<dyn StatementStreamSource>,
    phase: ModelPhase,
    dependency: Option<DependencyInfo>,
    namespace: Option<String>,
    extensions: Vec<StatementDefinition>,
    fragment: Option<StatementFragment>,
}

/// What per-source work may read from the batch.
struct BatchView<'a> {
    links: &'a [SourceLinks],
    registry: &'a StatementDefinitionRegistry,
}

impl SourceState {
    fn advance(&mut self, index: usize, phase: ModelPhase, batch: &BatchView<'_>) -> Result<(), ReactorError> {
        match phase {
            ModelPhase::Registered | ModelPhase::EffectiveModel => {}
            ModelPhase::SourceLinkage => {
                let dependency = self
                    .source
                    .dependency_info()
                    .map_err(|e| ReactorError::source_failure(phase, &self.name, e))?;
                let fragment = self.emit(phase, &StatementDefinitionRegistry::linkage(), None)?;
                let root = self.single_root(phase, &fragment)?;
                self.namespace = fragment.child_argument(root, "namespace").map(str::to_string);
                self.dependency = Some(dependency);
            }
            ModelPhase::StatementDefinition => {
                let links = &batch.links[index];
                let fragment = self.emit(phase, &StatementDefinitionRegistry::definition(), Some(&links.prefixes))?;
                let root = self.single_root(phase, &fragment)?;
                self.extensions = extension_definitions(&fragment, root, &links.namespace);
            }
            ModelPhase::FullDeclaration => {
                let links = &batch.links[index];
                let fragment = self.emit(phase, batch.registry, Some(&links.prefixes))?;
                self.single_root(phase, &fragment)?;
                self.fragment = Some(fragment);
            }
        }
        tracing::trace!("{}: {} done", self.name, phase);
        self.phase = phase;
        Ok(())
    }

    fn emit(
        &self,
        phase: ModelPhase,
        definitions: &StatementDefinitionRegistry,
        prefixes: Option<&PrefixToModule>,
    ) -> Result<StatementFragment, ReactorError> {
        let mut builder = ContextTreeBuilder::new();
        self.source
            .write_statements(&mut builder, definitions, prefixes)
            .map_err(|e| ReactorError::source_failure(phase, &self.name, e))?;
        builder.finish().map_err(|cause| ReactorError::Emission {
            phase,
            name: self.name.to_string(),
            cause,
        })
    }

    fn single_root(&self, phase: ModelPhase, fragment: &StatementFragment) -> Result<usize, ReactorError> {
        fragment.root().ok_or_else(|| {
            ReactorError::source_failure(
                phase,
                &self.name,
                SourceError::extraction(self.name.as_ref(), "expected exactly one module or submodule statement"),
            )
        })
    }
}

/// The statement definitions introduced by a source's `extension`
/// statements, qualified with the namespace of the owning module.
fn extension_definitions(
    fragment: &StatementFragment,
    root: usize,
    namespace: &ModuleNamespace,
) -> Vec<StatementDefinition> {
    fragment
        .children_named(root, "extension")
        .filter_map(|extension| {
            let name = fragment.node(extension).argument.as_deref()?;
            let argument = fragment.children_named(extension, "argument").next().and_then(|argument| {
                let argument_name = fragment.node(argument).argument.as_deref()?;
                Some(ArgumentDefinition {
                    name: argument_name.into(),
                    yin_element: fragment.child_argument(argument, "yin-element") == Some("true"),
                })
            });
            Some(StatementDefinition::extension(
                QName::new(namespace.as_ref(), name),
                argument,
            ))
        })
        .collect()
}

/// One batch of sources and the state of its build.
///
/// A failed phase is fatal: the error is kept and returned by every later
/// call. Requests made out of phase order are rejected with
/// [`ReactorError::PhaseOrder`] and leave the session usable.
pub struct BuildSession {
    config: ReactorConfig,
    sources: Vec<SourceState>,
    batch: ModelPhase,
    links: Vec<SourceLinks>,
    registry: StatementDefinitionRegistry,
    arena: ContextArena,
    roots: Vec<ContextId>,
    model: Option<EffectiveModel>,
    failure: Option<ReactorError>,
}

impl BuildSession {
    pub fn new(config: ReactorConfig) -> Self {
        Self {
            config,
            sources: Vec::new(),
            batch: ModelPhase::Registered,
            links: Vec::new(),
            registry: StatementDefinitionRegistry::new(),
            arena: ContextArena::new(),
            roots: Vec::new(),
            model: None,
            failure: None,
        }
    }

    /// Register a statement source. Only allowed before SOURCE_LINKAGE.
    pub fn add_source(
        &mut self,
        name: impl Into<Arc<str>>,
        source: Arc<dyn StatementStreamSource>,
    ) -> Result<SourceId, ReactorError> {
        let name = name.into();
        if self.batch != ModelPhase::Registered {
            return Err(ReactorError::PhaseOrder {
                requested: ModelPhase::Registered,
                name: name.to_string(),
                reached: ModelPhase::Registered,
                batch: self.batch,
            });
        }
        let id = SourceId(self.sources.len());
        self.sources.push(SourceState {
            name,
            source,
            phase: ModelPhase::Registered,
            dependency: None,
            namespace: None,
            extensions: Vec::new(),
            fragment: None,
        });
        Ok(id)
    }

    /// Register any cached representation. Text and XML forms are turned
    /// into their tree forms first.
    pub fn add_schema_source(&mut self, source: SchemaSource) -> Result<SourceId, ReactorError> {
        let name = source.name().clone();
        let stream: Arc<dyn StatementStreamSource> = match source {
            SchemaSource::YangText(text) => text
                .to_ast()
                .map_err(|e| ReactorError::source_failure(ModelPhase::Registered, &name, e))?,
            SchemaSource::YangAst(ast) => ast,
            SchemaSource::YinXml(xml) => xml.to_dom(),
            SchemaSource::YinDom(dom) => dom,
        };
        self.add_source(name, stream)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The last phase the whole batch completed.
    pub fn phase(&self) -> ModelPhase {
        self.batch
    }

    /// The phase `id` has completed.
    pub fn source_phase(&self, id: SourceId) -> Option<ModelPhase> {
        self.sources.get(id.0).map(|s| s.phase)
    }

    /// Run `phase`'s per-source work for one source.
    ///
    /// Fails with [`ReactorError::PhaseOrder`] unless the batch completed
    /// the previous phase. A source already at `phase` is left alone.
    ///
    /// # Panics
    ///
    /// If `id` was not returned by this session.
    pub fn advance_source(&mut self, id: SourceId, phase: ModelPhase) -> Result<(), ReactorError> {
        self.check_failed()?;
        let state = &self.sources[id.0];
        if state.phase >= phase {
            return Ok(());
        }
        let required = phase.previous().unwrap_or(ModelPhase::Registered);
        if self.batch < required || state.phase < required {
            return Err(ReactorError::PhaseOrder {
                requested: phase,
                name: state.name.to_string(),
                reached: state.phase,
                batch: self.batch,
            });
        }
        let view = BatchView {
            links: &self.links,
            registry: &self.registry,
        };
        let result = self.sources[id.0].advance(id.0, phase, &view);
        self.record(result)
    }

    /// Complete `phase` for the whole batch: finish outstanding per-source
    /// work, then run the phase's global step.
    pub fn complete_phase(&mut self, phase: ModelPhase) -> Result<(), ReactorError> {
        self.check_failed()?;
        if self.batch >= phase {
            return Ok(());
        }
        let required = phase.previous().unwrap_or(ModelPhase::Registered);
        if self.batch != required {
            let name = self
                .sources
                .iter()
                .find(|s| s.phase < required)
                .map(|s| s.name.to_string())
                .unwrap_or_default();
            return Err(ReactorError::PhaseOrder {
                requested: phase,
                name,
                reached: self.batch,
                batch: self.batch,
            });
        }

        tracing::debug!("{}: starting for {} source(s)", phase, self.sources.len());
        let result = self.run_sources(phase).and_then(|()| self.finish_phase(phase));
        self.record(result)?;
        self.batch = phase;
        tracing::debug!("{}: complete", phase);
        Ok(())
    }

    /// Run every remaining phase and hand over the effective model.
    pub fn build(mut self) -> Result<EffectiveModel, ReactorError> {
        let mut phase = self.batch;
        while let Some(next) = phase.next() {
            self.complete_phase(next)?;
            phase = next;
        }
        self.check_failed()?;
        self.model.take().ok_or_else(|| {
            ReactorError::inference(&StatementSourceReference::unknown(), "effective model is not available")
        })
    }

    fn check_failed(&self) -> Result<(), ReactorError> {
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: Result<(), ReactorError>) -> Result<(), ReactorError> {
        if let Err(e) = &result {
            self.failure = Some(e.clone());
        }
        result
    }

    fn run_sources(&mut self, phase: ModelPhase) -> Result<(), ReactorError> {
        let view = BatchView {
            links: &self.links,
            registry: &self.registry,
        };
        if self.config.parallel {
            self.sources
                .par_iter_mut()
                .enumerate()
                .filter(|(_, state)| state.phase < phase)
                .try_for_each(|(index, state)| state.advance(index, phase, &view))
        } else {
            self.sources
                .iter_mut()
                .enumerate()
                .filter(|(_, state)| state.phase < phase)
                .try_for_each(|(index, state)| state.advance(index, phase, &view))
        }
    }

    fn finish_phase(&mut self, phase: ModelPhase) -> Result<(), ReactorError> {
        match phase {
            ModelPhase::Registered => Ok(()),
            ModelPhase::SourceLinkage => self.link_sources(),
            ModelPhase::StatementDefinition => {
                let extensions = self.sources.iter().flat_map(|s| s.extensions.iter().cloned());
                self.registry = StatementDefinitionRegistry::full(extensions);
                tracing::debug!("{} statement definitions in scope", self.registry.len());
                Ok(())
            }
            ModelPhase::FullDeclaration => self.declare(),
            ModelPhase::EffectiveModel => self.build_model(),
        }
    }

    fn link_sources(&mut self) -> Result<(), ReactorError> {
        let mut inputs = Vec::with_capacity(self.sources.len());
        for state in &self.sources {
            let dependency = state.dependency.as_ref().ok_or_else(|| {
                ReactorError::source_failure(
                    ModelPhase::SourceLinkage,
                    &state.name,
                    SourceError::extraction(state.name.as_ref(), "dependency information was not extracted"),
                )
            })?;
            inputs.push(LinkageInput {
                dependency,
                namespace: state.namespace.as_deref(),
            });
        }
        self.links = link(&inputs)?;
        Ok(())
    }

    fn declare(&mut self) -> Result<(), ReactorError> {
        let mut roots = Vec::with_capacity(self.sources.len());
        for (index, state) in self.sources.iter_mut().enumerate() {
            let Some(fragment) = state.fragment.take() else {
                return Err(ReactorError::source_failure(
                    ModelPhase::FullDeclaration,
                    &state.name,
                    SourceError::extraction(state.name.as_ref(), "statement tree was not declared"),
                ));
            };
            let root = state.single_root(ModelPhase::FullDeclaration, &fragment)?;
            let namespace = &self.links[index].namespace;
            roots.push(
                self.arena
                    .insert_fragment(&fragment, root, index, namespace, &self.registry),
            );
        }
        self.roots = roots;

        Inference::new(&mut self.arena, &self.roots, &self.links, &self.config).run()?;
        self.arena.freeze();
        tracing::debug!("declared {} statement contexts", self.arena.len());
        Ok(())
    }

    /// Contexts carrying an `if-feature` for a feature the configuration
    /// does not support.
    fn pruned(&self) -> Result<FxHashSet<ContextId>, ReactorError> {
        let mut pruned = FxHashSet::default();
        if self.config.supported_features.is_none() {
            return Ok(pruned);
        }
        for root in &self.roots {
            for id in self.arena.effective_descendants(*root) {
                let context = self.arena.get(id);
                if !context.is("if-feature") {
                    continue;
                }
                let feature = feature_name(&self.arena, &self.links, id)?;
                if !self.config.is_feature_supported(&feature) {
                    if let Some(parent) = context.parent() {
                        tracing::trace!("pruning {} for feature {}", self.arena.get(parent).reference(), feature);
                        pruned.insert(parent);
                    }
                }
            }
        }
        Ok(pruned)
    }

    fn build_model(&mut self) -> Result<(), ReactorError> {
        let pruned = self.pruned()?;
        let mut sources = Vec::with_capacity(self.sources.len());
        for ((state, links), root) in self.sources.iter().zip(&self.links).zip(&self.roots) {
            let dependency = state.dependency.clone().ok_or_else(|| {
                ReactorError::source_failure(
                    ModelPhase::EffectiveModel,
                    &state.name,
                    SourceError::extraction(state.name.as_ref(), "dependency information was not extracted"),
                )
            })?;
            sources.push(ModelSource {
                dependency,
                namespace: links.namespace.clone(),
                root: *root,
                includes: links.includes.clone(),
            });
        }
        let arena = std::mem::take(&mut self.arena);
        self.model = Some(EffectiveModel::build(arena, sources, pruned, self.config.parallel)?);
        Ok(())
    }
}
