//! SOURCE_LINKAGE: resolve imports, includes and belongs-to between the
//! sources of one batch.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::{ModuleNamespace, Revision};
use crate::source::DependencyInfo;
use crate::stmt::PrefixToModule;

use super::error::LinkageError;

/// What linkage needs to know about one source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinkageInput<'a> {
    pub dependency: &'a DependencyInfo,
    /// Argument of the `namespace` statement, for modules.
    pub namespace: Option<&'a str>,
}

/// Resolved edges of one source. Indices refer to the linked batch.
#[derive(Debug, Clone)]
pub(crate) struct SourceLinks {
    pub namespace: ModuleNamespace,
    pub prefixes: PrefixToModule,
    /// Prefix to the module it names, including the source's own prefix.
    pub prefix_modules: FxHashMap<SmolStr, usize>,
    pub imports: Vec<usize>,
    pub includes: Vec<usize>,
    /// For submodules, the module they belong to.
    pub parent: Option<usize>,
}

impl SourceLinks {
    /// The module owning this source: itself, or the parent of a submodule.
    pub fn owner(&self, index: usize) -> usize {
        self.parent.unwrap_or(index)
    }
}

struct Catalog<'a> {
    inputs: &'a [LinkageInput<'a>],
    modules: FxHashMap<&'a str, Vec<usize>>,
    submodules: FxHashMap<&'a str, Vec<usize>>,
}

impl<'a> Catalog<'a> {
    fn new(inputs: &'a [LinkageInput<'a>]) -> Result<Self, LinkageError> {
        let mut seen = FxHashSet::default();
        let mut modules: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        let mut submodules: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        for (index, input) in inputs.iter().enumerate() {
            let identifier = input.dependency.source_identifier();
            if !seen.insert(identifier.clone()) {
                return Err(LinkageError::DuplicateSource { identifier });
            }
            let by_name = if input.dependency.is_submodule() {
                &mut submodules
            } else {
                &mut modules
            };
            by_name.entry(input.dependency.name.as_str()).or_default().push(index);
        }
        Ok(Self {
            inputs,
            modules,
            submodules,
        })
    }

    /// Exact revision when one is requested, otherwise the latest.
    fn find(index: &FxHashMap<&str, Vec<usize>>, inputs: &[LinkageInput<'_>], name: &str, revision: Option<&Revision>) -> Option<usize> {
        let candidates = index.get(name)?;
        match revision {
            Some(revision) => candidates
                .iter()
                .copied()
                .find(|c| inputs[*c].dependency.revision.as_ref() == Some(revision)),
            None => candidates
                .iter()
                .copied()
                .max_by(|a, b| inputs[*a].dependency.revision.cmp(&inputs[*b].dependency.revision)),
        }
    }

    fn module(&self, name: &str, revision: Option<&Revision>) -> Option<usize> {
        Self::find(&self.modules, self.inputs, name, revision)
    }

    fn submodule(&self, name: &str, revision: Option<&Revision>) -> Option<usize> {
        Self::find(&self.submodules, self.inputs, name, revision)
    }
}

/// Link every source of a batch. Fails on the first missing dependency,
/// mismatched belongs-to or dependency cycle.
pub(crate) fn link(inputs: &[LinkageInput<'_>]) -> Result<Vec<SourceLinks>, LinkageError> {
    let catalog = Catalog::new(inputs)?;

    let mut imports = Vec::with_capacity(inputs.len());
    let mut includes = Vec::with_capacity(inputs.len());
    let mut parents = Vec::with_capacity(inputs.len());
    for input in inputs {
        let dep = input.dependency;
        let identifier = dep.source_identifier();

        let mut resolved_imports = Vec::new();
        for import in &dep.imports {
            let target = catalog
                .module(&import.name, import.revision.as_ref())
                .ok_or_else(|| LinkageError::MissingImport {
                    identifier: identifier.clone(),
                    module: import.name.to_string(),
                    revision: import.revision.as_ref().map(Revision::to_string),
                })?;
            resolved_imports.push((import.prefix.clone(), target));
        }

        let parent = match &dep.belongs_to {
            Some(belongs_to) => Some(catalog.module(&belongs_to.name, None).ok_or_else(|| {
                LinkageError::MissingParent {
                    identifier: identifier.clone(),
                    parent: belongs_to.name.to_string(),
                }
            })?),
            None => None,
        };
        let owner_name = match &dep.belongs_to {
            Some(belongs_to) => belongs_to.name.as_str(),
            None => dep.name.as_str(),
        };

        let mut resolved_includes = Vec::new();
        for include in &dep.includes {
            let target = catalog
                .submodule(&include.name, include.revision.as_ref())
                .ok_or_else(|| LinkageError::MissingInclude {
                    identifier: identifier.clone(),
                    submodule: include.name.to_string(),
                    revision: include.revision.as_ref().map(Revision::to_string),
                })?;
            let declared = inputs[target]
                .dependency
                .belongs_to
                .as_ref()
                .map(|b| b.name.as_str())
                .unwrap_or_default();
            if declared != owner_name {
                return Err(LinkageError::BelongsToMismatch {
                    identifier: inputs[target].dependency.source_identifier(),
                    declared: declared.to_string(),
                    including: owner_name.to_string(),
                });
            }
            resolved_includes.push(target);
        }

        imports.push(resolved_imports);
        includes.push(resolved_includes);
        parents.push(parent);
    }

    detect_cycles(inputs, &imports, &includes)?;

    let mut namespaces: Vec<Option<ModuleNamespace>> = vec![None; inputs.len()];
    for (index, input) in inputs.iter().enumerate() {
        if !input.dependency.is_submodule() {
            let namespace = input.namespace.ok_or_else(|| LinkageError::MissingNamespace {
                identifier: input.dependency.source_identifier(),
            })?;
            namespaces[index] = Some(Arc::from(namespace));
        }
    }

    let mut links = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let owner = parents[index].unwrap_or(index);
        let Some(namespace) = namespaces[owner].clone() else {
            return Err(LinkageError::MissingNamespace {
                identifier: inputs[owner].dependency.source_identifier(),
            });
        };
        let mut prefixes = PrefixToModule::new();
        let mut prefix_modules = FxHashMap::default();
        prefixes.insert(input.dependency.prefix.clone(), namespace.clone());
        prefix_modules.insert(input.dependency.prefix.clone(), owner);
        for (prefix, target) in &imports[index] {
            if let Some(imported) = &namespaces[*target] {
                prefixes.insert(prefix.clone(), imported.clone());
            }
            prefix_modules.insert(prefix.clone(), *target);
        }
        links.push(SourceLinks {
            namespace,
            prefixes,
            prefix_modules,
            imports: imports[index].iter().map(|(_, target)| *target).collect(),
            includes: includes[index].clone(),
            parent: parents[index],
        });
    }
    Ok(links)
}

/// Depth-first search over import and include edges.
fn detect_cycles(
    inputs: &[LinkageInput<'_>],
    imports: &[Vec<(SmolStr, usize)>],
    includes: &[Vec<usize>],
) -> Result<(), LinkageError> {
    fn visit(
        node: usize,
        edges: &[Vec<usize>],
        inputs: &[LinkageInput<'_>],
        visited: &mut FxHashSet<usize>,
        stack: &mut Vec<usize>,
        on_stack: &mut FxHashSet<usize>,
    ) -> Result<(), LinkageError> {
        if on_stack.contains(&node) {
            let start = stack.iter().position(|n| *n == node).unwrap_or(0);
            let mut path: Vec<String> = stack[start..]
                .iter()
                .map(|n| inputs[*n].dependency.name.to_string())
                .collect();
            path.push(inputs[node].dependency.name.to_string());
            return Err(LinkageError::Cycle { path });
        }
        if !visited.insert(node) {
            return Ok(());
        }
        stack.push(node);
        on_stack.insert(node);
        for next in &edges[node] {
            visit(*next, edges, inputs, visited, stack, on_stack)?;
        }
        on_stack.remove(&node);
        stack.pop();
        Ok(())
    }

    let edges: Vec<Vec<usize>> = imports
        .iter()
        .zip(includes)
        .map(|(imports, includes)| {
            imports
                .iter()
                .map(|(_, target)| *target)
                .chain(includes.iter().copied())
                .collect()
        })
        .collect();
    let mut visited = FxHashSet::default();
    for node in 0..inputs.len() {
        visit(node, &edges, inputs, &mut visited, &mut Vec::new(), &mut FxHashSet::default())?;
    }
    Ok(())
}
