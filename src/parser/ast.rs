//! Typed AST wrappers over the untyped rowan CST.
//!
//! The statement grammar is uniform, so there are only four wrappers:
//! [`SourceFile`], [`Statement`], [`Keyword`] and [`Argument`].

use thiserror::Error;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};
use rowan::TextSize;

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(SourceFile, SOURCE_FILE);
ast_node!(Statement, STATEMENT);
ast_node!(Keyword, KEYWORD);
ast_node!(Argument, ARGUMENT);

// ============================================================================
// Root
// ============================================================================

impl SourceFile {
    /// Wrap a root node already known to be a `SOURCE_FILE`.
    pub(crate) fn from_root(node: SyntaxNode) -> Self {
        debug_assert_eq!(node.kind(), SyntaxKind::SOURCE_FILE);
        Self(node)
    }

    pub fn statements(&self) -> impl Iterator<Item = Statement> + '_ {
        self.0.children().filter_map(Statement::cast)
    }
}

// ============================================================================
// Statement
// ============================================================================

impl Statement {
    pub fn keyword(&self) -> Option<Keyword> {
        self.0.children().find_map(Keyword::cast)
    }

    pub fn argument(&self) -> Option<Argument> {
        self.0.children().find_map(Argument::cast)
    }

    /// Nested statements inside the `{ ... }` block, in source order.
    pub fn substatements(&self) -> impl Iterator<Item = Statement> + use<> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::BLOCK)
            .flat_map(|block| block.children().filter_map(Statement::cast))
    }

    /// True when the block holds at least one nested statement. An empty
    /// `{ }` block does not count.
    pub fn has_body(&self) -> bool {
        self.substatements().next().is_some()
    }

    pub fn offset(&self) -> TextSize {
        self.0.text_range().start()
    }

    /// Convenience: argument text of the first substatement with `keyword`.
    pub fn find_argument(&self, keyword: &str) -> Option<String> {
        self.substatements()
            .find(|s| s.keyword_text().as_deref() == Some(keyword))
            .and_then(|s| s.argument())
            .and_then(|a| a.value().ok())
    }

    pub fn keyword_text(&self) -> Option<String> {
        self.keyword().map(|k| k.text())
    }
}

// ============================================================================
// Keyword
// ============================================================================

impl Keyword {
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }

    /// Split `prefix:identifier`; built-in keywords have no prefix.
    pub fn prefix_and_identifier(&self) -> (Option<String>, String) {
        let text = self.text();
        match text.split_once(':') {
            Some((prefix, identifier)) => (Some(prefix.to_string()), identifier.to_string()),
            None => (None, text),
        }
    }
}

// ============================================================================
// Argument
// ============================================================================

/// Malformed argument text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("invalid escape sequence '\\{escape}' in quoted string")]
    InvalidEscape { escape: char, offset: TextSize },
    #[error("unterminated escape sequence in quoted string")]
    TrailingBackslash { offset: TextSize },
}

impl ArgumentError {
    pub fn offset(&self) -> TextSize {
        match self {
            Self::InvalidEscape { offset, .. } | Self::TrailingBackslash { offset } => *offset,
        }
    }
}

impl Argument {
    fn parts(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind().is_string())
    }

    pub fn offset(&self) -> TextSize {
        self.0.text_range().start()
    }

    /// The argument value with quotes removed, escapes processed and `+`
    /// concatenations joined.
    pub fn value(&self) -> Result<String, ArgumentError> {
        let mut value = String::new();
        for part in self.parts() {
            let text = part.text();
            match part.kind() {
                SyntaxKind::SQ_STRING => value.push_str(&text[1..text.len() - 1]),
                SyntaxKind::DQ_STRING => {
                    let inner = &text[1..text.len() - 1];
                    let indent = quote_column(&part) + 1;
                    let unescaped = unescape(inner, part.text_range().start() + TextSize::new(1))?;
                    value.push_str(&trim_continuation_lines(&unescaped, indent));
                }
                _ => value.push_str(text),
            }
        }
        Ok(value)
    }
}

fn unescape(inner: &str, base: TextSize) -> Result<String, ArgumentError> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let offset = base + TextSize::new(idx as u32);
        match chars.next() {
            Some((_, 'n')) => out.push('\n'),
            Some((_, 't')) => out.push('\t'),
            Some((_, '"')) => out.push('"'),
            Some((_, '\\')) => out.push('\\'),
            Some((_, escape)) => return Err(ArgumentError::InvalidEscape { escape, offset }),
            None => return Err(ArgumentError::TrailingBackslash { offset }),
        }
    }
    Ok(out)
}

/// Column of the opening quote, counting tabs as eight columns.
fn quote_column(token: &SyntaxToken) -> usize {
    let mut column = 0;
    let mut current = token.prev_token();
    while let Some(prev) = current {
        let text = prev.text();
        match text.rfind('\n') {
            Some(idx) => return column + display_width(&text[idx + 1..]),
            None => column += display_width(text),
        }
        current = prev.prev_token();
    }
    column
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| if c == '\t' { 8 } else { 1 }).sum()
}

/// Multi-line double-quoted strings drop trailing whitespace before each line
/// break and the indentation up to the column after the opening quote.
fn trim_continuation_lines(text: &str, indent: usize) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    let mut lines = text.split('\n');
    let mut out = String::with_capacity(text.len());
    if let Some(first) = lines.next() {
        out.push_str(first.trim_end_matches([' ', '\t']));
    }
    for line in lines {
        out.push('\n');
        let mut skipped = 0;
        let mut rest = line;
        for c in line.chars() {
            if skipped >= indent || !(c == ' ' || c == '\t') {
                break;
            }
            skipped += if c == '\t' { 8 } else { 1 };
            rest = &rest[1..];
        }
        out.push_str(rest);
    }
    // Only lines followed by a break lose trailing whitespace
    let last_break = out.rfind('\n').unwrap_or(0);
    let (head, tail) = out.split_at(last_break);
    let head: Vec<&str> = head.split('\n').map(|l| l.trim_end_matches([' ', '\t'])).collect();
    format!("{}{}", head.join("\n"), tail)
}
