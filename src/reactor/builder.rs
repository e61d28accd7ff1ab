//! Builds statement trees from the emitter's event stream.

use crate::base::{QName, StatementSourceReference};
use crate::stmt::{EmissionError, StatementWriter};

/// One statement of a [`StatementFragment`].
#[derive(Debug, Clone)]
pub struct FragmentNode {
    pub keyword: QName,
    pub argument: Option<String>,
    pub reference: StatementSourceReference,
    pub children: Vec<usize>,
}

/// The statement tree of one source as written in one phase, before it is
/// placed into the shared context arena.
#[derive(Debug, Clone, Default)]
pub struct StatementFragment {
    nodes: Vec<FragmentNode>,
    roots: Vec<usize>,
}

impl StatementFragment {
    pub fn nodes(&self) -> &[FragmentNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &FragmentNode {
        &self.nodes[index]
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// The single top-level statement, if there is exactly one.
    pub fn root(&self) -> Option<usize> {
        match self.roots.as_slice() {
            [root] => Some(*root),
            _ => None,
        }
    }

    /// Children of `index` whose keyword has the built-in name `keyword`.
    pub fn children_named<'a>(&'a self, index: usize, keyword: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.nodes[index]
            .children
            .iter()
            .copied()
            .filter(move |child| {
                let node = &self.nodes[*child];
                node.keyword.is_builtin() && node.keyword.local_name() == keyword
            })
    }

    /// Argument of the first `keyword` child of `index`.
    pub fn child_argument(&self, index: usize, keyword: &str) -> Option<&str> {
        self.children_named(index, keyword)
            .find_map(|child| self.nodes[child].argument.as_deref())
    }
}

/// The [`StatementWriter`] used by every reactor phase.
#[derive(Debug, Default)]
pub struct ContextTreeBuilder {
    fragment: StatementFragment,
    open: Vec<usize>,
}

impl ContextTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished tree. Statements still open are an unbalanced stream.
    pub fn finish(self) -> Result<StatementFragment, EmissionError> {
        match self.open.last() {
            Some(open) => Err(EmissionError::unbalanced(
                &self.fragment.nodes[*open].reference,
                "statement was never closed",
            )),
            None => Ok(self.fragment),
        }
    }
}

impl StatementWriter for ContextTreeBuilder {
    fn start_statement(
        &mut self,
        keyword: QName,
        reference: StatementSourceReference,
    ) -> Result<(), EmissionError> {
        let index = self.fragment.nodes.len();
        self.fragment.nodes.push(FragmentNode {
            keyword,
            argument: None,
            reference,
            children: Vec::new(),
        });
        match self.open.last() {
            Some(parent) => self.fragment.nodes[*parent].children.push(index),
            None => self.fragment.roots.push(index),
        }
        self.open.push(index);
        Ok(())
    }

    fn argument_value(
        &mut self,
        value: String,
        reference: StatementSourceReference,
    ) -> Result<(), EmissionError> {
        let Some(current) = self.open.last() else {
            return Err(EmissionError::unbalanced(&reference, "argument outside of a statement"));
        };
        let node = &mut self.fragment.nodes[*current];
        if node.argument.is_some() {
            return Err(EmissionError::unbalanced(
                &reference,
                format!("second argument for statement '{}'", node.keyword),
            ));
        }
        node.argument = Some(value);
        Ok(())
    }

    fn end_statement(&mut self, reference: StatementSourceReference) -> Result<(), EmissionError> {
        self.open
            .pop()
            .map(|_| ())
            .ok_or_else(|| EmissionError::unbalanced(&reference, "end of statement without start"))
    }
}
