//! Lightweight dependency metadata extracted before semantic analysis.
//!
//! Only the statements needed to discover cross-source edges are read:
//! the module/submodule header, `revision`, `prefix`, `import`, `include`
//! and `belongs-to`. Everything else is ignored at this stage.

use indexmap::IndexSet;
use smol_str::SmolStr;

use crate::base::{Revision, SourceIdentifier};
use crate::parser::{SourceFile, Statement};

use super::error::SourceError;
use super::yin::{YinDocument, YinElement};

/// Whether a source is a module or a submodule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Module,
    Submodule,
}

impl ModuleKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Submodule => "submodule",
        }
    }
}

/// An `import` edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleImport {
    pub name: SmolStr,
    pub prefix: SmolStr,
    pub revision: Option<Revision>,
}

/// An `include` edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleInclude {
    pub name: SmolStr,
    pub revision: Option<Revision>,
}

/// The `belongs-to` link of a submodule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BelongsTo {
    pub name: SmolStr,
    pub prefix: SmolStr,
}

/// Immutable dependency record of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    pub kind: ModuleKind,
    pub name: SmolStr,
    pub revision: Option<Revision>,
    pub prefix: SmolStr,
    pub imports: IndexSet<ModuleImport>,
    pub includes: IndexSet<ModuleInclude>,
    pub belongs_to: Option<BelongsTo>,
}

impl DependencyInfo {
    /// Extract dependency information from a parsed statement tree.
    ///
    /// `name` is only used for error reporting.
    pub fn from_ast(name: &str, file: &SourceFile) -> Result<Self, SourceError> {
        let mut roots = file.statements();
        let root = roots
            .next()
            .ok_or_else(|| SourceError::extraction(name, "no module or submodule statement"))?;
        if roots.next().is_some() {
            return Err(SourceError::extraction(
                name,
                "more than one top-level statement",
            ));
        }
        extract(name, &root)
    }

    /// Extract dependency information from a YIN document.
    pub fn from_yin(name: &str, document: &YinDocument) -> Result<Self, SourceError> {
        extract(name, &document.root())
    }

    pub fn formatted_revision(&self) -> Option<String> {
        self.revision.as_ref().map(Revision::to_string)
    }

    pub fn source_identifier(&self) -> SourceIdentifier {
        SourceIdentifier::new(self.name.clone(), self.revision.clone())
    }

    pub fn is_submodule(&self) -> bool {
        self.kind == ModuleKind::Submodule
    }
}

/// The minimal view of a statement needed for extraction, shared by the
/// YANG tree and the YIN document.
trait LinkageStatement: Sized {
    fn keyword(&self) -> Option<String>;
    fn argument(&self) -> Option<String>;
    fn children(&self) -> Vec<Self>;

    fn child_argument(&self, keyword: &str) -> Option<String> {
        self.children()
            .into_iter()
            .find(|c| c.keyword().as_deref() == Some(keyword))
            .and_then(|c| c.argument())
    }
}

impl LinkageStatement for Statement {
    fn keyword(&self) -> Option<String> {
        self.keyword_text()
    }

    fn argument(&self) -> Option<String> {
        Statement::argument(self).and_then(|a| a.value().ok())
    }

    fn children(&self) -> Vec<Self> {
        self.substatements().collect()
    }
}

impl LinkageStatement for &YinElement {
    fn keyword(&self) -> Option<String> {
        self.is_builtin().then(|| self.name().to_string())
    }

    fn argument(&self) -> Option<String> {
        let attribute = match self.name() {
            "module" | "submodule" => "name",
            "import" | "include" | "belongs-to" => "module",
            "prefix" | "yang-version" => "value",
            "revision" | "revision-date" => "date",
            "namespace" => "uri",
            _ => return None,
        };
        self.attribute(attribute).map(str::to_string)
    }

    fn children(&self) -> Vec<Self> {
        YinElement::children(*self).iter().collect()
    }
}

fn extract<S: LinkageStatement>(name: &str, root: &S) -> Result<DependencyInfo, SourceError> {
    let kind = match root.keyword().as_deref() {
        Some("module") => ModuleKind::Module,
        Some("submodule") => ModuleKind::Submodule,
        Some(other) => {
            return Err(SourceError::extraction(
                name,
                format!("expected module or submodule, found '{other}'"),
            ));
        }
        None => {
            return Err(SourceError::extraction(
                name,
                "no module or submodule statement",
            ));
        }
    };
    let module_name = root.argument().ok_or_else(|| {
        SourceError::extraction(name, format!("{} statement has no name", kind.keyword()))
    })?;

    let mut revision: Option<Revision> = None;
    let mut prefix = None;
    let mut imports = IndexSet::new();
    let mut includes = IndexSet::new();
    let mut belongs_to = None;

    for child in root.children() {
        match child.keyword().as_deref() {
            Some("revision") => {
                let date = parse_revision(name, child.argument())?;
                if revision.as_ref().is_none_or(|latest| date > *latest) {
                    revision = Some(date);
                }
            }
            Some("prefix") => prefix = child.argument(),
            Some("import") => {
                let module = required(name, "import", child.argument())?;
                let import_prefix = child.child_argument("prefix").ok_or_else(|| {
                    SourceError::extraction(name, format!("import of '{module}' has no prefix"))
                })?;
                imports.insert(ModuleImport {
                    name: module.into(),
                    prefix: import_prefix.into(),
                    revision: optional_revision(name, child.child_argument("revision-date"))?,
                });
            }
            Some("include") => {
                let module = required(name, "include", child.argument())?;
                includes.insert(ModuleInclude {
                    name: module.into(),
                    revision: optional_revision(name, child.child_argument("revision-date"))?,
                });
            }
            Some("belongs-to") => {
                let parent = required(name, "belongs-to", child.argument())?;
                let parent_prefix = child.child_argument("prefix").ok_or_else(|| {
                    SourceError::extraction(name, format!("belongs-to '{parent}' has no prefix"))
                })?;
                belongs_to = Some(BelongsTo {
                    name: parent.into(),
                    prefix: parent_prefix.into(),
                });
            }
            _ => {}
        }
    }

    let prefix = match kind {
        ModuleKind::Module => prefix
            .ok_or_else(|| SourceError::extraction(name, format!("module '{module_name}' has no prefix")))?,
        ModuleKind::Submodule => belongs_to
            .as_ref()
            .map(|b| b.prefix.to_string())
            .ok_or_else(|| {
                SourceError::extraction(
                    name,
                    format!("submodule '{module_name}' has no belongs-to statement"),
                )
            })?,
    };

    Ok(DependencyInfo {
        kind,
        name: module_name.into(),
        revision,
        prefix: prefix.into(),
        imports,
        includes,
        belongs_to,
    })
}

fn required(name: &str, keyword: &str, argument: Option<String>) -> Result<String, SourceError> {
    argument.ok_or_else(|| SourceError::extraction(name, format!("{keyword} statement has no argument")))
}

fn parse_revision(name: &str, argument: Option<String>) -> Result<Revision, SourceError> {
    let text = required(name, "revision", argument)?;
    Revision::parse(&text).map_err(|e| SourceError::extraction(name, e.to_string()))
}

fn optional_revision(name: &str, argument: Option<String>) -> Result<Option<Revision>, SourceError> {
    argument
        .map(|text| parse_revision(name, Some(text)))
        .transpose()
}
