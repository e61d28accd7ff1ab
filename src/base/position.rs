/// Position tracking for statements
///
/// Every emitted statement carries a [`StatementSourceReference`] so that
/// diagnostics from any phase can point back at the source file and line.
use std::fmt;
use std::sync::Arc;

use text_size::TextSize;

use super::constants::UNKNOWN_SOURCE;

/// A position in source code (1-indexed, as printed in diagnostics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Maps byte offsets to line/column pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self { line_starts }
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let column = offset - self.line_starts[line];
        LineCol::new(line as u32 + 1, u32::from(column) + 1)
    }
}

/// Provenance of a statement: source name plus position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementSourceReference {
    source: Arc<str>,
    position: Option<LineCol>,
}

impl StatementSourceReference {
    pub fn new(source: Arc<str>, position: LineCol) -> Self {
        Self {
            source,
            position: Some(position),
        }
    }

    /// Reference to a whole source, without a position.
    pub fn source_only(source: Arc<str>) -> Self {
        Self {
            source,
            position: None,
        }
    }

    pub fn unknown() -> Self {
        Self::source_only(Arc::from(UNKNOWN_SOURCE))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn position(&self) -> Option<LineCol> {
        self.position
    }
}

impl fmt::Display for StatementSourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}:{}:{}", self.source, pos.line, pos.column),
            None => f.write_str(&self.source),
        }
    }
}
