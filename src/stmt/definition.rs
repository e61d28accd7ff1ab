//! Statement definitions and the per-phase vocabularies built from them.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::QName;

/// How a statement's argument is named and where YIN stores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentDefinition {
    pub name: SmolStr,
    /// The argument is a child element rather than an attribute in YIN.
    pub yin_element: bool,
}

/// Where a definition comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    /// An RFC 6020 statement.
    Builtin,
    /// A statement defined by an `extension` in some module.
    Extension,
    /// A `type` with a body, keyed by its type name.
    TypeBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementDefinition {
    name: QName,
    argument: Option<ArgumentDefinition>,
    kind: DefinitionKind,
}

impl StatementDefinition {
    pub fn builtin(name: &str, argument: Option<(&str, bool)>) -> Self {
        Self {
            name: QName::yin(name),
            argument: argument.map(|(name, yin_element)| ArgumentDefinition {
                name: name.into(),
                yin_element,
            }),
            kind: DefinitionKind::Builtin,
        }
    }

    pub fn extension(name: QName, argument: Option<ArgumentDefinition>) -> Self {
        Self {
            name,
            argument,
            kind: DefinitionKind::Extension,
        }
    }

    /// The definition backing a rewritten `type` statement whose keyword is
    /// the type name itself.
    pub fn type_body(name: QName) -> Self {
        Self {
            name,
            argument: Some(ArgumentDefinition {
                name: "name".into(),
                yin_element: false,
            }),
            kind: DefinitionKind::TypeBody,
        }
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn argument(&self) -> Option<&ArgumentDefinition> {
        self.argument.as_ref()
    }

    pub fn has_argument(&self) -> bool {
        self.argument.is_some()
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    pub fn is_extension(&self) -> bool {
        self.kind == DefinitionKind::Extension
    }
}

/// RFC 6020 statements: keyword, argument name, argument is a YIN element.
pub const BUILTIN_STATEMENTS: &[(&str, Option<(&str, bool)>)] = &[
    ("anyxml", Some(("name", false))),
    ("argument", Some(("name", false))),
    ("augment", Some(("target-node", false))),
    ("base", Some(("name", false))),
    ("belongs-to", Some(("module", false))),
    ("bit", Some(("name", false))),
    ("case", Some(("name", false))),
    ("choice", Some(("name", false))),
    ("config", Some(("value", false))),
    ("contact", Some(("text", true))),
    ("container", Some(("name", false))),
    ("default", Some(("value", false))),
    ("description", Some(("text", true))),
    ("deviate", Some(("value", false))),
    ("deviation", Some(("target-node", false))),
    ("enum", Some(("name", false))),
    ("error-app-tag", Some(("value", false))),
    ("error-message", Some(("value", true))),
    ("extension", Some(("name", false))),
    ("feature", Some(("name", false))),
    ("fraction-digits", Some(("value", false))),
    ("grouping", Some(("name", false))),
    ("identity", Some(("name", false))),
    ("if-feature", Some(("name", false))),
    ("import", Some(("module", false))),
    ("include", Some(("module", false))),
    ("input", None),
    ("key", Some(("value", false))),
    ("leaf", Some(("name", false))),
    ("leaf-list", Some(("name", false))),
    ("length", Some(("value", false))),
    ("list", Some(("name", false))),
    ("mandatory", Some(("value", false))),
    ("max-elements", Some(("value", false))),
    ("min-elements", Some(("value", false))),
    ("module", Some(("name", false))),
    ("must", Some(("condition", false))),
    ("namespace", Some(("uri", false))),
    ("notification", Some(("name", false))),
    ("ordered-by", Some(("value", false))),
    ("organization", Some(("text", true))),
    ("output", None),
    ("path", Some(("value", false))),
    ("pattern", Some(("value", false))),
    ("position", Some(("value", false))),
    ("prefix", Some(("value", false))),
    ("presence", Some(("value", false))),
    ("range", Some(("value", false))),
    ("reference", Some(("text", true))),
    ("refine", Some(("target-node", false))),
    ("require-instance", Some(("value", false))),
    ("revision", Some(("date", false))),
    ("revision-date", Some(("date", false))),
    ("rpc", Some(("name", false))),
    ("status", Some(("value", false))),
    ("submodule", Some(("name", false))),
    ("type", Some(("name", false))),
    ("typedef", Some(("name", false))),
    ("unique", Some(("tag", false))),
    ("units", Some(("name", false))),
    ("uses", Some(("name", false))),
    ("value", Some(("value", false))),
    ("when", Some(("condition", false))),
    ("yang-version", Some(("value", false))),
    ("yin-element", Some(("value", false))),
];

/// Statements understood while resolving cross-source edges.
pub const LINKAGE_STATEMENTS: &[&str] = &[
    "module",
    "submodule",
    "namespace",
    "prefix",
    "import",
    "include",
    "belongs-to",
    "revision",
    "revision-date",
    "yang-version",
];

/// Statements understood while collecting extension definitions.
pub const DEFINITION_STATEMENTS: &[&str] = &["module", "submodule", "extension", "argument", "yin-element"];

/// The statements valid in one build phase, keyed by qualified keyword.
#[derive(Debug, Clone, Default)]
pub struct StatementDefinitionRegistry {
    definitions: IndexMap<QName, Arc<StatementDefinition>>,
}

impl StatementDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every RFC 6020 statement.
    pub fn builtins() -> Self {
        let mut registry = Self::new();
        for (name, argument) in BUILTIN_STATEMENTS {
            registry.register(StatementDefinition::builtin(name, *argument));
        }
        registry
    }

    /// The vocabulary of the source linkage phase.
    pub fn linkage() -> Self {
        Self::builtin_subset(LINKAGE_STATEMENTS)
    }

    /// The vocabulary of the statement definition phase.
    pub fn definition() -> Self {
        Self::builtin_subset(DEFINITION_STATEMENTS)
    }

    /// The full declaration vocabulary: all built-ins plus `extensions`.
    pub fn full(extensions: impl IntoIterator<Item = StatementDefinition>) -> Self {
        let mut registry = Self::builtins();
        for extension in extensions {
            registry.register(extension);
        }
        registry
    }

    fn builtin_subset(names: &[&str]) -> Self {
        let mut registry = Self::new();
        for (name, argument) in BUILTIN_STATEMENTS {
            if names.contains(name) {
                registry.register(StatementDefinition::builtin(name, *argument));
            }
        }
        registry
    }

    /// Add a definition. A definition with the same name is replaced.
    pub fn register(&mut self, definition: StatementDefinition) {
        self.definitions
            .insert(definition.name().clone(), Arc::new(definition));
    }

    pub fn get(&self, name: &QName) -> Option<&Arc<StatementDefinition>> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &QName) -> bool {
        self.definitions.contains_key(name)
    }

    /// The definition for a keyword received from an emitter. Keywords that
    /// are not registered can only come from `type` rewriting.
    pub fn resolve(&self, name: &QName) -> Arc<StatementDefinition> {
        match self.definitions.get(name) {
            Some(definition) => definition.clone(),
            None => Arc::new(StatementDefinition::type_body(name.clone())),
        }
    }

    pub fn extensions(&self) -> impl Iterator<Item = &Arc<StatementDefinition>> {
        self.definitions.values().filter(|d| d.is_extension())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// The keyword-validity oracle consulted by the emitters.
pub fn is_valid(definitions: &StatementDefinitionRegistry, keyword: &QName) -> bool {
    definitions.contains(keyword)
}
