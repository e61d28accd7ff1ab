//! YANG text sources and their parsed-tree representation.

use std::sync::Arc;

use crate::base::{LineCol, LineIndex, SourceIdentifier};
use crate::parser::{AstNode, GreenNode, SourceFile, SyntaxNode, parse};

use super::dependency::DependencyInfo;
use super::error::SourceError;
use super::memo::Memoized;

/// Raw YANG text.
#[derive(Debug)]
pub struct YangTextSource {
    identifier: SourceIdentifier,
    name: Arc<str>,
    text: Arc<str>,
    ast: Memoized<AstSchemaSource>,
}

impl YangTextSource {
    pub fn new(identifier: SourceIdentifier, name: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self {
            identifier,
            name: name.into(),
            text: text.into(),
            ast: Memoized::new(),
        }
    }

    /// A text source whose identifier is taken from its own header.
    pub fn from_text(name: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Result<Self, SourceError> {
        let name = name.into();
        let text = text.into();
        let ast = AstSchemaSource::parse(&name, &text)?;
        Ok(Self {
            identifier: ast.identifier().clone(),
            name,
            text,
            ast: Memoized::with_value(Arc::new(ast)),
        })
    }

    pub fn identifier(&self) -> &SourceIdentifier {
        &self.identifier
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed tree with dependency information, built on first access
    /// and shared by all later callers.
    pub fn to_ast(&self) -> Result<Arc<AstSchemaSource>, SourceError> {
        self.ast
            .get_or_compute(&self.identifier, || AstSchemaSource::parse(&self.name, &self.text))
    }
}

/// A syntactically valid statement tree plus the dependency information
/// extracted from it.
///
/// Instances are a natural caching point: the text parsed, it passed basic
/// validation and its cross-source edges are known.
#[derive(Debug, Clone)]
pub struct AstSchemaSource {
    identifier: SourceIdentifier,
    name: Arc<str>,
    tree: GreenNode,
    dependency: DependencyInfo,
    line_index: Arc<LineIndex>,
}

impl AstSchemaSource {
    /// Wrap an externally parsed tree, extracting dependency information.
    ///
    /// `name` is only used for error reporting.
    pub fn create(name: impl Into<Arc<str>>, tree: GreenNode) -> Result<Self, SourceError> {
        let name = name.into();
        let root = SyntaxNode::new_root(tree.clone());
        let file = SourceFile::cast(root.clone())
            .ok_or_else(|| SourceError::extraction(name.as_ref(), "tree is not a source file"))?;
        let dependency = DependencyInfo::from_ast(&name, &file)?;
        let line_index = LineIndex::new(&root.text().to_string());
        Ok(Self {
            identifier: dependency.source_identifier(),
            name,
            tree,
            dependency,
            line_index: Arc::new(line_index),
        })
    }

    /// Parse text and wrap the resulting tree. Any syntax error fails the
    /// whole source.
    pub fn parse(name: &Arc<str>, text: &str) -> Result<Self, SourceError> {
        let parse = parse(text);
        if let Some(error) = parse.errors.first() {
            let LineCol { line, column } = LineIndex::new(text).line_col(error.range.start());
            return Err(SourceError::Syntax {
                name: name.to_string(),
                line,
                column,
                message: error.message.clone(),
            });
        }
        Self::create(name.clone(), parse.green)
    }

    pub fn identifier(&self) -> &SourceIdentifier {
        &self.identifier
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn dependency_info(&self) -> &DependencyInfo {
        &self.dependency
    }

    pub fn source_file(&self) -> SourceFile {
        SourceFile::from_root(SyntaxNode::new_root(self.tree.clone()))
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn tree(&self) -> &GreenNode {
        &self.tree
    }
}
