//! Error types for schema source handling.

use std::sync::Arc;

use thiserror::Error;

use crate::base::SourceIdentifier;

/// Errors raised while reading, parsing or transforming schema sources.
///
/// Clonable so a memoized failure can be handed to every caller of the
/// failing representation instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The text did not parse into a statement tree.
    #[error("{name}:{line}:{column}: syntax error: {message}")]
    Syntax {
        name: String,
        line: u32,
        column: u32,
        message: String,
    },

    /// Dependency metadata is missing or malformed.
    #[error("{name}: {message}")]
    Extraction { name: String, message: String },

    /// XML parsing error in a YIN source.
    #[error("{name}: XML error: {message}")]
    Xml { name: String, message: String },

    /// IO error during read.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Transforming one representation into another failed.
    #[error("failed to transform schema source {identifier}: {cause}")]
    Transform {
        identifier: SourceIdentifier,
        #[source]
        cause: Arc<SourceError>,
    },
}

impl SourceError {
    /// Create a dependency extraction error.
    pub fn extraction(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an XML error.
    pub fn xml(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Xml {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<String>, error: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }

    pub fn transform(identifier: &SourceIdentifier, cause: SourceError) -> Self {
        Self::Transform {
            identifier: identifier.clone(),
            cause: Arc::new(cause),
        }
    }

    /// The innermost error, unwrapping transformation layers.
    pub fn root_cause(&self) -> &SourceError {
        match self {
            Self::Transform { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}
