//! Errors raised while building declared and effective statements.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::base::{QName, StatementSourceReference};

/// Identifies the statement context an error is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextIdentity {
    pub keyword: QName,
    pub argument: Option<String>,
    pub reference: StatementSourceReference,
}

impl fmt::Display for ContextIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{} '{}' at {}", self.keyword, argument, self.reference),
            None => write!(f, "{} at {}", self.keyword, self.reference),
        }
    }
}

/// A canonical context could not be turned into a declared statement, or
/// was modified after it was frozen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// The statement requires an argument and has none.
    #[error("{context}: missing argument")]
    MissingArgument { context: ContextIdentity },

    /// The statement takes no argument but one was given.
    #[error("{context}: unexpected argument")]
    UnexpectedArgument { context: ContextIdentity },

    /// The context tree was modified after FULL_DECLARATION.
    #[error("{context}: statement tree is frozen")]
    Frozen { context: ContextIdentity },
}

impl DeclarationError {
    pub fn context(&self) -> &ContextIdentity {
        match self {
            Self::MissingArgument { context }
            | Self::UnexpectedArgument { context }
            | Self::Frozen { context } => context,
        }
    }
}

/// An effective statement could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectiveBuildError {
    /// Building the shared declared statement failed.
    #[error("{context}: failed to build effective statement: {cause}")]
    Declaration {
        context: ContextIdentity,
        #[source]
        cause: Arc<DeclarationError>,
    },

    /// A lazy accessor ran after its model was dropped.
    #[error("{context}: effective model is no longer available")]
    ModelDropped { context: ContextIdentity },
}

impl EffectiveBuildError {
    pub fn context(&self) -> &ContextIdentity {
        match self {
            Self::Declaration { context, .. } | Self::ModelDropped { context } => context,
        }
    }
}
