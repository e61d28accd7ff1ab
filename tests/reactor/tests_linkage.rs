//! SOURCE_LINKAGE failures are fatal for the batch and name the source.

use rstest::rstest;
use yangtree::reactor::{LinkageError, ReactorError};

use crate::helpers::reactor_helpers::{build, try_build};
use crate::helpers::source_fixtures::{CHILD_SUBMODULE, IMPORTED_MODULE, IMPORTING_MODULE, PARENT_MODULE};

const CYCLIC_B: &str = r#"
module b {
    namespace "urn:test:b";
    prefix b;
    import a { prefix a; }
}
"#;

const OTHER_PARENT: &str = r#"
module other {
    namespace "urn:test:other";
    prefix o;
    include child;
}
"#;

fn linkage_error(sources: &[(&str, &str)]) -> LinkageError {
    match try_build(sources) {
        Err(ReactorError::Linkage(e)) => e,
        Err(other) => panic!("Expected a linkage error, got {}", other),
        Ok(_) => panic!("Expected a linkage error, build succeeded"),
    }
}

#[test]
fn test_missing_import() {
    let err = linkage_error(&[("a", IMPORTING_MODULE)]);
    match &err {
        LinkageError::MissingImport { identifier, module, .. } => {
            assert_eq!(identifier.name(), "a");
            assert_eq!(module, "b");
        }
        other => panic!("Expected MissingImport, got {}", other),
    }
    assert!(err.to_string().contains("imported module 'b'"));
}

#[test]
fn test_import_cycle() {
    let err = linkage_error(&[("a", IMPORTING_MODULE), ("b", CYCLIC_B)]);
    let LinkageError::Cycle { path } = err else {
        panic!("Expected a cycle, got {}", err);
    };
    assert!(path.contains(&"a".to_string()));
    assert!(path.contains(&"b".to_string()));
    assert_eq!(path.first(), path.last());
}

#[rstest]
#[case::missing_namespace(&[("n", "module n { prefix n; }")], "n")]
#[case::duplicate_source(&[("b", IMPORTED_MODULE), ("b-again", IMPORTED_MODULE)], "b")]
#[case::missing_parent(&[("child", CHILD_SUBMODULE)], "child")]
#[case::belongs_to_mismatch(
    &[("other", OTHER_PARENT), ("parent", PARENT_MODULE), ("child", CHILD_SUBMODULE)],
    "child"
)]
fn test_linkage_error_names_source(#[case] sources: &[(&str, &str)], #[case] offender: &str) {
    let err = linkage_error(sources);
    let identifier = match &err {
        LinkageError::MissingNamespace { identifier }
        | LinkageError::DuplicateSource { identifier }
        | LinkageError::MissingParent { identifier, .. }
        | LinkageError::BelongsToMismatch { identifier, .. } => identifier,
        other => panic!("Unexpected linkage error {}", other),
    };
    assert_eq!(identifier.name(), offender);
}

#[test]
fn test_missing_include() {
    let err = linkage_error(&[("parent", PARENT_MODULE)]);
    assert!(matches!(err, LinkageError::MissingInclude { ref submodule, .. } if submodule == "child"));
}

#[test]
fn test_import_prefix_resolves_in_order_independent_batches() {
    // Registration order does not matter for linkage.
    let forward = build(&[("a", IMPORTING_MODULE), ("b", IMPORTED_MODULE)]);
    let backward = build(&[("b", IMPORTED_MODULE), ("a", IMPORTING_MODULE)]);
    assert_eq!(forward.forest().len(), 2);
    assert_eq!(backward.forest().len(), 2);
    assert_eq!(forward.find_module("a").unwrap().imports.len(), 1);
}
