//! Error types for reactor runs.

use thiserror::Error;

use crate::base::{SourceIdentifier, StatementSourceReference};
use crate::model::{DeclarationError, EffectiveBuildError};
use crate::source::SourceError;
use crate::stmt::EmissionError;

use super::phase::ModelPhase;

/// Cross-source linkage failed. Fatal for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkageError {
    #[error("{identifier}: imported module '{module}'{} not found", revision_suffix(.revision))]
    MissingImport {
        identifier: SourceIdentifier,
        module: String,
        revision: Option<String>,
    },

    #[error("{identifier}: included submodule '{submodule}'{} not found", revision_suffix(.revision))]
    MissingInclude {
        identifier: SourceIdentifier,
        submodule: String,
        revision: Option<String>,
    },

    #[error("{identifier}: parent module '{parent}' of submodule not found")]
    MissingParent { identifier: SourceIdentifier, parent: String },

    #[error("{identifier}: submodule belongs to '{declared}' but is included by '{including}'")]
    BelongsToMismatch {
        identifier: SourceIdentifier,
        declared: String,
        including: String,
    },

    #[error("{identifier}: module has no namespace statement")]
    MissingNamespace { identifier: SourceIdentifier },

    #[error("{identifier}: source registered more than once")]
    DuplicateSource { identifier: SourceIdentifier },

    #[error("dependency cycle detected: {}", .path.join(" \u{2192} "))]
    Cycle { path: Vec<String> },
}

fn revision_suffix(revision: &Option<String>) -> String {
    revision.as_ref().map(|r| format!("@{r}")).unwrap_or_default()
}

/// A reactor run failed. Each variant names the offending source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactorError {
    /// A source could not be read, parsed or transformed.
    #[error("{phase}: {name}: {cause}")]
    Source {
        phase: ModelPhase,
        name: String,
        #[source]
        cause: SourceError,
    },

    /// A statement tree did not have the shape the phase needs.
    #[error("{phase}: {name}: {cause}")]
    Emission {
        phase: ModelPhase,
        name: String,
        #[source]
        cause: EmissionError,
    },

    #[error("SOURCE_LINKAGE: {0}")]
    Linkage(#[from] LinkageError),

    /// Phase work requested before the batch reached the required phase.
    #[error("cannot run {requested} for {name}: source is at {reached}, batch is at {batch}")]
    PhaseOrder {
        requested: ModelPhase,
        name: String,
        reached: ModelPhase,
        batch: ModelPhase,
    },

    /// A cross reference (grouping, augment, deviation, refine or feature)
    /// could not be resolved.
    #[error("{phase}: {reference}: {message}")]
    Inference {
        phase: ModelPhase,
        reference: StatementSourceReference,
        message: String,
    },

    #[error("FULL_DECLARATION: {0}")]
    Declaration(#[from] DeclarationError),

    #[error("EFFECTIVE_MODEL: {0}")]
    EffectiveBuild(#[from] EffectiveBuildError),
}

impl ReactorError {
    pub(crate) fn source_failure(phase: ModelPhase, name: &str, cause: SourceError) -> Self {
        Self::Source {
            phase,
            name: name.to_string(),
            cause,
        }
    }

    pub(crate) fn inference(reference: &StatementSourceReference, message: impl Into<String>) -> Self {
        Self::Inference {
            phase: ModelPhase::FullDeclaration,
            reference: reference.clone(),
            message: message.into(),
        }
    }
}
