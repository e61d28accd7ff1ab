//! # yang-reactor
//!
//! Statement build reactor for YANG modules: dependency extraction, source
//! linkage, and declared/effective statement models.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → Directory loading into the source cache
//!   ↓
//! model     → DeclaredStatement / EffectiveStatement / EffectiveModel
//!   ↓
//! reactor   → Phased build session, context arena, inference
//!   ↓
//! stmt      → Statement vocabulary, emitters, StatementWriter
//!   ↓
//! source    → Source representations, cache, DependencyInfo
//!   ↓
//! parser    → Logos lexer, rowan statement parser, AST layer
//!   ↓
//! base      → Primitives (SourceIdentifier, QName, LineIndex)
//! ```
//!
//! `reactor` and `model` refer to each other: the arena reports
//! [`model::DeclarationError`]s and the model reads the frozen arena.

// ============================================================================
// MODULES (dependency order: base → parser → source → stmt → reactor → model → project)
// ============================================================================

/// Foundation types: SourceIdentifier, QName, provenance
pub mod base;

/// Parser: Logos lexer, rowan CST, typed AST wrappers
pub mod parser;

/// Source representations, memoized transforms and the source cache
pub mod source;

/// Statement definitions and the statement event stream
pub mod stmt;

/// The phased build reactor
pub mod reactor;

/// Declared and effective statements
pub mod model;

/// Project management: loading sources from disk
pub mod project;

// Re-export foundation types
pub use base::{LineCol, LineIndex, ModuleNamespace, QName, Revision, SourceIdentifier, StatementSourceReference};

// Re-export the types most callers need
pub use model::{DeclaredStatement, EffectiveModel, EffectiveStatement, Module, Submodule};
pub use reactor::{BuildSession, ModelPhase, ReactorConfig, ReactorError, StatementReactor};
pub use source::{DependencyInfo, SchemaSource, SchemaSourceCache, SourceError};
