//! Extension statements are built lazily and resolve their definition
//! through the model, also when the definition uses itself.

use std::sync::Arc;

use yangtree::model::EffectiveBuildError;
use yangtree::QName;

use crate::helpers::reactor_helpers::{build, child, names, root};
use crate::helpers::source_fixtures::RECURSIVE_EXTENSION;

#[test]
fn test_extension_statements_are_not_substatements() {
    let model = build(&[("ext", RECURSIVE_EXTENSION)]);
    let annotated = child(root(&model, "ext"), "container", "annotated");

    assert_eq!(names(&annotated), ["leaf plain"]);
    let unknown = annotated.unknown_substatements().unwrap();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].keyword(), &QName::new("urn:test:ext", "annotation"));
    assert_eq!(unknown[0].argument(), Some("on a container"));
    assert_eq!(annotated.all_substatements().unwrap().len(), 2);
}

#[test]
fn test_recursive_extension_definition() {
    let model = build(&[("ext", RECURSIVE_EXTENSION)]);
    let module = root(&model, "ext");
    let extension = child(module, "extension", "annotation");

    let annotated = child(module, "container", "annotated");
    let usage = annotated.unknown_substatements().unwrap().remove(0);
    let definition = usage.extension_definition().unwrap().unwrap();
    assert!(Arc::ptr_eq(&definition, &extension));

    // The definition's own usage points back at the definition.
    let nested = extension.unknown_substatements().unwrap();
    assert_eq!(nested.len(), 1);
    let again = nested[0].extension_definition().unwrap().unwrap();
    assert!(Arc::ptr_eq(&again, &extension));
    let nested_again = again.unknown_substatements().unwrap();
    assert!(Arc::ptr_eq(&nested_again[0], &nested[0]));
}

#[test]
fn test_unknown_substatements_are_cached() {
    let model = build(&[("ext", RECURSIVE_EXTENSION)]);
    let annotated = child(root(&model, "ext"), "container", "annotated");

    let first = annotated.unknown_substatements().unwrap();
    let second = annotated.unknown_substatements().unwrap();
    assert!(Arc::ptr_eq(&first[0], &second[0]));
}

#[test]
fn test_builtin_has_no_extension_definition() {
    let model = build(&[("ext", RECURSIVE_EXTENSION)]);
    let annotated = child(root(&model, "ext"), "container", "annotated");
    assert!(annotated.extension_definition().unwrap().is_none());
}

#[test]
fn test_lazy_access_after_model_is_dropped() {
    let model = build(&[("ext", RECURSIVE_EXTENSION)]);
    let annotated = child(root(&model, "ext"), "container", "annotated");
    drop(model);

    // Eagerly built parts stay available.
    assert_eq!(names(&annotated), ["leaf plain"]);
    let err = annotated.unknown_substatements().unwrap_err();
    assert!(matches!(err, EffectiveBuildError::ModelDropped { .. }));
    assert_eq!(err.context().argument.as_deref(), Some("annotated"));
}
