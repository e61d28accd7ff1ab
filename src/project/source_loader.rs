use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use crate::base::SourceIdentifier;
use crate::model::EffectiveModel;
use crate::reactor::{ModelPhase, ReactorError, StatementReactor};
use crate::source::{RepresentationKind, SchemaSourceCache, SourceError};

use super::file_loader;

/// Files that failed to load, with the reason for each.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {} file(s):{}", .failures.len(), format_failures(.failures))]
pub struct LoadError {
    pub failures: Vec<(PathBuf, SourceError)>,
}

fn format_failures(failures: &[(PathBuf, SourceError)]) -> String {
    failures
        .iter()
        .map(|(path, error)| format!("\n  {}: {}", path.display(), error))
        .collect()
}

/// Loads schema sources from disk into a shared [`SchemaSourceCache`].
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    cache: Arc<SchemaSourceCache>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: Arc<SchemaSourceCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<SchemaSourceCache> {
        &self.cache
    }

    /// Load every `.yang` and `.yin` file below `path`, parsing in
    /// parallel. Files that load are cached even when others fail.
    pub fn load_directory(&self, path: impl AsRef<Path>) -> Result<Vec<SourceIdentifier>, LoadError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(LoadError {
                failures: vec![(
                    path.to_path_buf(),
                    SourceError::extraction(path.display().to_string(), "directory not found"),
                )],
            });
        }
        let paths = file_loader::collect_file_paths(path).map_err(|e| LoadError {
            failures: vec![(path.to_path_buf(), e)],
        })?;

        let results: Vec<_> = paths
            .par_iter()
            .map(|path| (path, file_loader::load_source(path)))
            .collect();

        let mut loaded = Vec::new();
        let mut failures = Vec::new();
        for (path, result) in results {
            match result {
                Ok(source) => {
                    tracing::debug!("loaded {} as {}", path.display(), source.identifier());
                    loaded.push(source.identifier().clone());
                    self.cache.put(source);
                }
                Err(e) => failures.push((path.clone(), e)),
            }
        }

        if failures.is_empty() {
            Ok(loaded)
        } else {
            Err(LoadError { failures })
        }
    }

    /// Load a single file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<SourceIdentifier, SourceError> {
        let source = file_loader::load_source(path.as_ref())?;
        let identifier = source.identifier().clone();
        self.cache.put(source);
        Ok(identifier)
    }

    /// Build every cached source in one reactor batch.
    pub fn build(&self, reactor: &StatementReactor) -> Result<EffectiveModel, ReactorError> {
        let mut identifiers = self.cache.identifiers();
        identifiers.sort();

        let mut session = reactor.new_build();
        for identifier in identifiers {
            let name = identifier.to_string();
            let source = [RepresentationKind::YangAst, RepresentationKind::YinDom]
                .into_iter()
                .find_map(|kind| self.cache.get(&identifier, kind).transpose())
                .transpose()
                .map_err(|e| ReactorError::source_failure(ModelPhase::Registered, &name, e))?;
            match source {
                Some(source) => {
                    session.add_schema_source(source)?;
                }
                None => tracing::warn!("{}: no buildable representation cached", name),
            }
        }
        session.build()
    }
}
