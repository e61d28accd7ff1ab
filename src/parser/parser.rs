//! Recursive descent parser for YANG statement sources
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse statement source text into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens, input.len());
    parser.parse_source_file();
    parser.finish()
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    end: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end: TextSize::new(len as u32),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        !self.at_eof() && kinds.contains(&self.current_kind())
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Look ahead `n` significant tokens, skipping trivia.
    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map(|t| t.kind)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn skip_trivia(&mut self) {
        while self.current().map(|t| t.kind.is_trivia()).unwrap_or(false) {
            self.bump();
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| TextRange::empty(self.end));
        self.errors.push(SyntaxError::new(message, range));
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.builder.start_node(SyntaxKind::ERROR.into());
        // Always consume at least one token to make progress
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.builder.finish_node();
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    fn parse_source_file(&mut self) {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());
        loop {
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            if self.at(SyntaxKind::UNQUOTED) {
                self.parse_statement();
            } else {
                self.error_recover("expected statement keyword", &[SyntaxKind::UNQUOTED]);
            }
        }
        self.builder.finish_node();
    }

    /// statement := keyword [argument] (";" | block)
    fn parse_statement(&mut self) {
        self.builder.start_node(SyntaxKind::STATEMENT.into());

        self.builder.start_node(SyntaxKind::KEYWORD.into());
        self.bump();
        self.builder.finish_node();

        self.skip_trivia();
        if self.current().map(|t| t.kind.is_string()).unwrap_or(false) {
            self.parse_argument();
            self.skip_trivia();
        }

        if self.at(SyntaxKind::SEMICOLON) {
            self.bump();
        } else if self.at(SyntaxKind::L_BRACE) {
            self.parse_block();
        } else {
            self.error("expected ';' or '{'");
        }

        self.builder.finish_node();
    }

    /// argument := unquoted | quoted ("+" quoted)*
    fn parse_argument(&mut self) {
        self.builder.start_node(SyntaxKind::ARGUMENT.into());
        let quoted = self.current_kind().is_quoted();
        self.bump();
        if quoted {
            while self.nth(0) == Some(SyntaxKind::PLUS)
                && self.nth(1).map(SyntaxKind::is_quoted).unwrap_or(false)
            {
                self.skip_trivia();
                self.bump(); // +
                self.skip_trivia();
                self.bump(); // quoted
            }
        }
        self.builder.finish_node();
    }

    fn parse_block(&mut self) {
        self.builder.start_node(SyntaxKind::BLOCK.into());
        self.bump(); // {
        loop {
            self.skip_trivia();
            if self.at_eof() {
                self.error("expected '}'");
                break;
            }
            if self.at(SyntaxKind::R_BRACE) {
                self.bump();
                break;
            }
            if self.at(SyntaxKind::UNQUOTED) {
                self.parse_statement();
            } else {
                self.error_recover(
                    "expected statement keyword or '}'",
                    &[SyntaxKind::UNQUOTED, SyntaxKind::R_BRACE],
                );
            }
        }
        self.builder.finish_node();
    }
}
