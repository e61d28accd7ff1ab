//! Copies of a statement share the declared statement of the canonical
//! context; effective statements are built per context.

use std::sync::Arc;

use rstest::rstest;
use yangtree::reactor::{CopyKind, ReactorConfig};

use crate::helpers::reactor_helpers::{child, root, try_build_with};
use crate::helpers::source_fixtures::NESTED_GROUPINGS;

#[rstest]
#[case::sequential(false)]
#[case::parallel(true)]
fn test_copies_of_copies_share_declared(#[case] parallel: bool) {
    let config = ReactorConfig::default().with_parallel(parallel);
    let model = try_build_with(&[("nested", NESTED_GROUPINGS)], config).unwrap();
    let module = root(&model, "nested");

    let canonical = child(&child(module, "grouping", "inner"), "leaf", "x");
    let in_outer = child(&child(module, "grouping", "outer"), "leaf", "x");
    let in_first = child(&child(module, "container", "first"), "leaf", "x");
    let in_second = child(&child(module, "container", "second"), "leaf", "x");

    assert_eq!(canonical.copy_origin(), None);
    for copy in [&in_outer, &in_first, &in_second] {
        assert_eq!(copy.copy_origin(), Some(CopyKind::AddedByUses));
        assert!(Arc::ptr_eq(copy.declared(), canonical.declared()));
        assert!(!Arc::ptr_eq(copy, &canonical));
    }
    assert!(!Arc::ptr_eq(&in_first, &in_second));

    // Substatements of the copies are shared the same way.
    let canonical_type = canonical.find_first("type").unwrap();
    let first_type = in_first.find_first("type").unwrap();
    assert!(Arc::ptr_eq(first_type.declared(), canonical_type.declared()));
}

#[test]
fn test_copies_take_the_namespace_of_their_target() {
    let importing = r#"
    module user {
        namespace "urn:test:user";
        prefix u;
        import nested { prefix n; }
        container mine { uses n:inner; }
    }
    "#;
    let model = try_build_with(
        &[("nested", NESTED_GROUPINGS), ("user", importing)],
        ReactorConfig::default(),
    )
    .unwrap();

    let canonical = child(&child(root(&model, "nested"), "grouping", "inner"), "leaf", "x");
    let copied = child(&child(root(&model, "user"), "container", "mine"), "leaf", "x");
    assert_eq!(canonical.namespace().as_ref(), "urn:test:nested");
    assert_eq!(copied.namespace().as_ref(), "urn:test:user");
    assert!(Arc::ptr_eq(copied.declared(), canonical.declared()));
}

#[test]
fn test_declared_tree_echoes_source() {
    let model = try_build_with(&[("nested", NESTED_GROUPINGS)], ReactorConfig::default()).unwrap();
    let first = child(root(&model, "nested"), "container", "first");

    // The declared form keeps `uses` and has no expanded leaf.
    let declared = first.declared();
    assert_eq!(declared.argument(), Some("first"));
    assert!(declared.find_first("uses").is_some());
    assert!(declared.find_first("leaf").is_none());
}
