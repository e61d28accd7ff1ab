//! Schema source representations, their caching and dependency extraction
//!
//! A source is known by its [`SourceIdentifier`](crate::base::SourceIdentifier)
//! in every representation:
//!
//! ```text
//! YangTextSource ──to_ast()──▶ AstSchemaSource  (CST + DependencyInfo)
//! YinXmlSource   ──to_dom()──▶ YinDomSource     (YinDocument)
//! ```
//!
//! Derived forms are built at most once per instance and shared.

mod cache;
mod dependency;
mod error;
mod memo;
mod text;
mod yin;

pub use cache::{RepresentationKind, SchemaSource, SchemaSourceCache};
pub use dependency::{BelongsTo, DependencyInfo, ModuleImport, ModuleInclude, ModuleKind};
pub use error::SourceError;
pub use text::{AstSchemaSource, YangTextSource};
pub use yin::{
    XmlTransformer, YinDocument, YinDomSource, YinElement, YinSource, YinXmlSource,
};
