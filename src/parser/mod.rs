//! Rowan-based lossless parser for YANG statement sources
//!
//! This module provides the concrete syntax tree consumed by the rest of the
//! crate, using:
//! - **logos** for fast lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! The grammar is the generic statement grammar only. Keyword validity,
//! argument meaning and cross references are decided later by the statement
//! emitter and the reactor.
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! AST layer → SourceFile / Statement / Keyword / Argument
//! ```

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod lexer;
mod syntax_kind;

pub use ast::{Argument, ArgumentError, AstNode, Keyword, SourceFile, Statement};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{Parse, SyntaxError, parse};
pub use syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, YangLanguage};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
