//! Foundation types for the statement reactor.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`SourceIdentifier`], [`Revision`] - Stable keys for module sources
//! - [`QName`], [`ModuleNamespace`] - Qualified statement keywords
//! - [`StatementSourceReference`] - Provenance attached to every statement
//! - [`LineIndex`], [`LineCol`] - Offset to line/column conversion
//! - Domain constants (namespaces, file extensions)
//!
//! This module has NO dependencies on other crate modules.

pub mod constants;
mod identifier;
mod position;
mod qname;

pub use identifier::{Revision, RevisionError, SourceIdentifier};
pub use position::{LineCol, LineIndex, StatementSourceReference};
pub use qname::{ModuleNamespace, QName};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
