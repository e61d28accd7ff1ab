//! Syntax kinds for the Rowan-based CST
//!
//! The statement grammar is uniform: every construct is a statement made of
//! a keyword, an optional argument and either `;` or a braced block.

/// All syntax kinds (tokens and nodes) of the statement grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // TOKENS
    // =========================================================================
    UNQUOTED,  // identifiers, prefixed keywords, dates, paths
    DQ_STRING, // "text"
    SQ_STRING, // 'text'
    L_BRACE,   // {
    R_BRACE,   // }
    SEMICOLON, // ;
    PLUS,      // + (string concatenation)

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    STATEMENT,
    KEYWORD,
    ARGUMENT,
    BLOCK,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Check if this token can carry an argument string
    pub fn is_string(self) -> bool {
        matches!(self, Self::UNQUOTED | Self::DQ_STRING | Self::SQ_STRING)
    }

    pub fn is_quoted(self) -> bool {
        matches!(self, Self::DQ_STRING | Self::SQ_STRING)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YangLanguage {}

impl rowan::Language for YangLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<YangLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<YangLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<YangLanguage>;
