//! Statement emitters: walk a YANG tree or a YIN document and feed the
//! statement event stream into a [`StatementWriter`].
//!
//! Both walkers share one state machine:
//! - a keyword that the current vocabulary does not know is skipped together
//!   with its argument and its whole subtree; following siblings are emitted
//!   normally,
//! - a `type` with a non-empty body is rewritten so that its type name
//!   becomes the statement keyword (`type uint32 { range ..; }` starts a
//!   `uint32` statement with argument `uint32`),
//! - skipping wins over type rewriting.
//!
//! Per-occurrence problems are logged as warnings and never stop the walk.

use std::sync::Arc;

use crate::base::{LineIndex, QName, StatementSourceReference};
use crate::parser::{SourceFile, Statement};
use crate::source::{YinDocument, YinElement};

use super::definition::{StatementDefinition, StatementDefinitionRegistry, is_valid};
use super::error::EmissionError;
use super::prefix::PrefixToModule;
use super::writer::StatementWriter;

/// A statement node either walker can traverse.
trait EmittableStatement: Sized {
    /// The keyword exactly as written.
    fn keyword_text(&self) -> String;

    fn resolve_keyword(&self, prefixes: Option<&PrefixToModule>) -> Result<QName, EmissionError>;

    fn argument(&self, definition: &StatementDefinition) -> Option<Result<String, EmissionError>>;

    /// Children to walk. With a definition, nodes that merely carry the
    /// argument are left out.
    fn substatements(&self, definition: Option<&StatementDefinition>) -> Vec<Self>;

    fn reference(&self) -> StatementSourceReference;
}

/// Walk state threaded through one traversal.
#[derive(Debug, Default)]
struct EmitState {
    /// Keywords of the skipped statements enclosing the current node,
    /// innermost last.
    skipped: Vec<String>,
    /// A `type` with a body was entered; its argument opens the statement.
    defer_type: bool,
}

impl EmitState {
    fn skip(&mut self, keyword: String) -> Disposition {
        self.skipped.push(keyword);
        Disposition::Skipped
    }

    fn in_skipped_subtree(&self) -> bool {
        !self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Emitted,
    Skipped,
}

/// Emits statement events for one source.
#[derive(Debug, Clone, Copy)]
pub struct StatementEmitter<'a> {
    definitions: &'a StatementDefinitionRegistry,
    prefixes: Option<&'a PrefixToModule>,
}

impl<'a> StatementEmitter<'a> {
    /// `definitions` is the vocabulary of the current phase; `prefixes`
    /// resolves prefixed keywords and type names, when available.
    pub fn new(definitions: &'a StatementDefinitionRegistry, prefixes: Option<&'a PrefixToModule>) -> Self {
        Self {
            definitions,
            prefixes,
        }
    }

    /// Emit every top-level statement of a YANG source.
    pub fn emit_yang(
        &self,
        source: &Arc<str>,
        file: &SourceFile,
        index: &LineIndex,
        writer: &mut dyn StatementWriter,
    ) {
        for statement in file.statements() {
            self.emit_yang_statement(source, statement, index, writer);
        }
    }

    /// Emit the subtree rooted at one YANG statement.
    pub fn emit_yang_statement(
        &self,
        source: &Arc<str>,
        statement: Statement,
        index: &LineIndex,
        writer: &mut dyn StatementWriter,
    ) {
        let node = YangNode {
            statement,
            source,
            index,
        };
        self.walk(&node, &mut EmitState::default(), writer);
    }

    /// Emit a YIN document.
    pub fn emit_yin(&self, source: &Arc<str>, document: &YinDocument, writer: &mut dyn StatementWriter) {
        let node = YinNode {
            element: document.root(),
            source,
        };
        self.walk(&node, &mut EmitState::default(), writer);
    }

    fn walk<S: EmittableStatement>(&self, node: &S, state: &mut EmitState, writer: &mut dyn StatementWriter) {
        let reference = node.reference();
        let (mut disposition, definition) = self.enter(node, &reference, state, writer);

        if let Some(definition) = &definition {
            if state.defer_type {
                state.defer_type = false;
                disposition = self.open_type_body(node, definition, &reference, state, writer);
            } else if let Some(argument) = node.argument(definition) {
                match argument {
                    Ok(value) => report(writer.argument_value(value, reference.clone())),
                    Err(e) => report(Err(e)),
                }
            }
        }

        let children = match disposition {
            Disposition::Emitted => node.substatements(definition.as_deref()),
            Disposition::Skipped => node.substatements(None),
        };
        for child in &children {
            self.walk(child, state, writer);
        }

        match disposition {
            Disposition::Emitted => report(writer.end_statement(reference)),
            Disposition::Skipped => {
                state.skipped.pop();
            }
        }
    }

    /// Decide whether a statement is emitted. Returns the definition only
    /// for emitted statements.
    fn enter<S: EmittableStatement>(
        &self,
        node: &S,
        reference: &StatementSourceReference,
        state: &mut EmitState,
        writer: &mut dyn StatementWriter,
    ) -> (Disposition, Option<Arc<StatementDefinition>>) {
        let text = node.keyword_text();
        if state.in_skipped_subtree() {
            return (state.skip(text), None);
        }
        let keyword = match node.resolve_keyword(self.prefixes) {
            Ok(keyword) => keyword,
            // Without a resolver, prefixed keywords are out of the vocabulary.
            Err(e) if self.prefixes.is_none() => {
                tracing::trace!("skipping prefixed statement: {}", e);
                return (state.skip(text), None);
            }
            Err(e) => {
                report(Err(e));
                return (state.skip(text), None);
            }
        };
        if !is_valid(self.definitions, &keyword) {
            tracing::trace!("skipping unsupported statement '{}' at {}", text, reference);
            return (state.skip(text), None);
        }
        let definition = self.definitions.resolve(&keyword);
        if keyword == QName::yin("type") && !node.substatements(Some(definition.as_ref())).is_empty() {
            state.defer_type = true;
        } else {
            report(writer.start_statement(keyword, reference.clone()));
        }
        (Disposition::Emitted, Some(definition))
    }

    /// Start the statement of a deferred `type`, keyed by its type name.
    /// A type that cannot be named is skipped with its body.
    fn open_type_body<S: EmittableStatement>(
        &self,
        node: &S,
        definition: &StatementDefinition,
        reference: &StatementSourceReference,
        state: &mut EmitState,
        writer: &mut dyn StatementWriter,
    ) -> Disposition {
        let keyword = match node.argument(definition) {
            Some(Ok(value)) => self.type_keyword(&value, reference).map(|keyword| (keyword, value)),
            Some(Err(e)) => Err(e),
            None => Err(EmissionError::MissingTypeArgument {
                reference: reference.clone(),
            }),
        };
        match keyword {
            Ok((keyword, value)) => {
                report(writer.start_statement(keyword, reference.clone()));
                report(writer.argument_value(value, reference.clone()));
                Disposition::Emitted
            }
            Err(e) => {
                report(Err(e));
                state.skip(node.keyword_text())
            }
        }
    }

    fn type_keyword(&self, name: &str, reference: &StatementSourceReference) -> Result<QName, EmissionError> {
        match name.split_once(':') {
            None => Ok(QName::yin(name)),
            Some((prefix, local_name)) => self
                .prefixes
                .and_then(|prefixes| prefixes.qualify(prefix, local_name))
                .ok_or_else(|| EmissionError::UnknownPrefix {
                    reference: reference.clone(),
                    prefix: prefix.to_string(),
                }),
        }
    }
}

fn report(result: Result<(), EmissionError>) {
    if let Err(e) = result {
        tracing::warn!("{}", e);
    }
}

// ============================================================================
// YANG
// ============================================================================

struct YangNode<'a> {
    statement: Statement,
    source: &'a Arc<str>,
    index: &'a LineIndex,
}

impl EmittableStatement for YangNode<'_> {
    fn keyword_text(&self) -> String {
        self.statement.keyword_text().unwrap_or_default()
    }

    fn resolve_keyword(&self, prefixes: Option<&PrefixToModule>) -> Result<QName, EmissionError> {
        let keyword = self.statement.keyword().ok_or_else(|| EmissionError::MissingKeyword {
            reference: self.reference(),
        })?;
        match keyword.prefix_and_identifier() {
            (None, identifier) => Ok(QName::yin(identifier)),
            (Some(prefix), identifier) => prefixes
                .and_then(|p| p.qualify(&prefix, &identifier))
                .ok_or_else(|| EmissionError::UnknownPrefix {
                    reference: self.reference(),
                    prefix,
                }),
        }
    }

    fn argument(&self, _: &StatementDefinition) -> Option<Result<String, EmissionError>> {
        let argument = self.statement.argument()?;
        Some(argument.value().map_err(|e| EmissionError::InvalidArgument {
            reference: StatementSourceReference::new(self.source.clone(), self.index.line_col(e.offset())),
            message: e.to_string(),
        }))
    }

    fn substatements(&self, _: Option<&StatementDefinition>) -> Vec<Self> {
        self.statement
            .substatements()
            .map(|statement| YangNode {
                statement,
                source: self.source,
                index: self.index,
            })
            .collect()
    }

    fn reference(&self) -> StatementSourceReference {
        StatementSourceReference::new(self.source.clone(), self.index.line_col(self.statement.offset()))
    }
}

// ============================================================================
// YIN
// ============================================================================

struct YinNode<'a> {
    element: &'a YinElement,
    source: &'a Arc<str>,
}

impl YinNode<'_> {
    fn argument_element(&self, definition: &StatementDefinition) -> Option<&YinElement> {
        let argument = definition.argument().filter(|a| a.yin_element)?;
        self.element
            .children()
            .iter()
            .find(|child| child.name() == argument.name && child.namespace() == self.element.namespace())
    }
}

impl EmittableStatement for YinNode<'_> {
    fn keyword_text(&self) -> String {
        self.element.name().to_string()
    }

    fn resolve_keyword(&self, _: Option<&PrefixToModule>) -> Result<QName, EmissionError> {
        match self.element.namespace() {
            Some(namespace) => Ok(QName::new(namespace, self.element.name())),
            None => Err(EmissionError::UnknownPrefix {
                reference: self.reference(),
                prefix: self.element.name().to_string(),
            }),
        }
    }

    fn argument(&self, definition: &StatementDefinition) -> Option<Result<String, EmissionError>> {
        let argument = definition.argument()?;
        let value = if argument.yin_element {
            self.argument_element(definition)?.text().to_string()
        } else {
            self.element.attribute(&argument.name)?.to_string()
        };
        Some(Ok(value))
    }

    fn substatements(&self, definition: Option<&StatementDefinition>) -> Vec<Self> {
        let argument = definition.and_then(|d| self.argument_element(d));
        self.element
            .children()
            .iter()
            .filter(|child| !argument.is_some_and(|a| std::ptr::eq(a, *child)))
            .map(|element| YinNode {
                element,
                source: self.source,
            })
            .collect()
    }

    fn reference(&self) -> StatementSourceReference {
        StatementSourceReference::new(self.source.clone(), self.element.position())
    }
}
