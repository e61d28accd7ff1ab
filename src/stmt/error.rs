//! Errors raised while emitting statement events.

use thiserror::Error;

use crate::base::StatementSourceReference;

/// A per-occurrence problem found while walking a statement tree.
///
/// The emitter logs these and keeps walking; none of them abort emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmissionError {
    /// Argument text could not be decoded (bad escape, unterminated string).
    #[error("{reference}: invalid argument: {message}")]
    InvalidArgument {
        reference: StatementSourceReference,
        message: String,
    },

    /// A keyword or type name used a prefix with no import behind it.
    #[error("{reference}: unknown prefix '{prefix}'")]
    UnknownPrefix {
        reference: StatementSourceReference,
        prefix: String,
    },

    /// A statement node without a keyword token.
    #[error("{reference}: statement has no keyword")]
    MissingKeyword { reference: StatementSourceReference },

    /// A `type` statement with a body but no type name.
    #[error("{reference}: type statement has a body but no argument")]
    MissingTypeArgument { reference: StatementSourceReference },

    /// The writer received events out of order.
    #[error("{reference}: {message}")]
    UnbalancedEvent {
        reference: StatementSourceReference,
        message: String,
    },
}

impl EmissionError {
    pub fn unbalanced(reference: &StatementSourceReference, message: impl Into<String>) -> Self {
        Self::UnbalancedEvent {
            reference: reference.clone(),
            message: message.into(),
        }
    }

    pub fn reference(&self) -> &StatementSourceReference {
        match self {
            Self::InvalidArgument { reference, .. }
            | Self::UnknownPrefix { reference, .. }
            | Self::MissingKeyword { reference }
            | Self::MissingTypeArgument { reference }
            | Self::UnbalancedEvent { reference, .. } => reference,
        }
    }
}
