//! Whole batches: modules with submodules, and mixed YANG/YIN input.

use std::sync::Arc;

use yangtree::reactor::{CopyKind, ReactorConfig};
use yangtree::source::{SchemaSource, YinXmlSource};
use yangtree::{SourceIdentifier, StatementReactor};

use crate::helpers::reactor_helpers::{ast, build, child, names, root};
use crate::helpers::source_fixtures::{AUGMENTS_YIN_MODULE, CHILD_SUBMODULE, PARENT_MODULE, YIN_MODULE};

#[test]
fn test_module_with_submodule() {
    let model = build(&[("parent", PARENT_MODULE), ("child", CHILD_SUBMODULE)]);
    assert_eq!(model.forest().len(), 2);
    assert_eq!(model.modules().len(), 1);

    let module = model.find_module("parent").unwrap();
    assert_eq!(module.namespace.as_ref(), "urn:test:parent");
    assert_eq!(module.prefix, "p");
    assert_eq!(module.submodules.len(), 1);
    let submodule = &module.submodules[0];
    assert_eq!(submodule.name, "child");
    assert_eq!(submodule.belongs_to, "parent");
    assert!(Arc::ptr_eq(&submodule.root, root(&model, "child")));
    assert!(Arc::ptr_eq(&module.root, root(&model, "parent")));

    // The submodule body is assembled into the module.
    let assembled = child(&module.root, "container", "from-child");
    assert_eq!(assembled.copy_origin(), Some(CopyKind::Include));
    assert_eq!(assembled.namespace().as_ref(), "urn:test:parent");
    assert_eq!(child(&assembled, "leaf", "flag").namespace().as_ref(), "urn:test:parent");
    assert!(child(&module.root, "container", "top").copy_origin().is_none());

    // The submodule's own tree is in the module namespace too.
    let original = child(&submodule.root, "container", "from-child");
    assert_eq!(original.namespace().as_ref(), "urn:test:parent");
    assert!(original.copy_origin().is_none());
    assert!(Arc::ptr_eq(original.declared(), assembled.declared()));

    assert!(model.find_module_by_namespace("urn:test:parent").is_some());
    assert!(model.find_module("child").is_none());
}

#[test]
fn test_yin_and_yang_in_one_batch() {
    let reactor = StatementReactor::new(ReactorConfig::default());
    let mut session = reactor.new_build();
    let xml = YinXmlSource::new(SourceIdentifier::new("yb", None), "yb.yin", YIN_MODULE);
    session.add_schema_source(SchemaSource::YinXml(Arc::new(xml))).unwrap();
    session.add_source("ya.yang", ast("ya.yang", AUGMENTS_YIN_MODULE)).unwrap();
    let model = session.build().unwrap();

    let top = child(root(&model, "yb"), "container", "top");
    assert_eq!(
        top.find_first("description").and_then(|d| d.argument()),
        Some("Declared in YIN")
    );
    let augmented = child(&top, "leaf", "from-yang");
    assert_eq!(augmented.copy_origin(), Some(CopyKind::Augmentation));
    assert_eq!(augmented.namespace().as_ref(), "urn:test:ya");
    assert_eq!(top.namespace().as_ref(), "urn:test:yb");
    assert_eq!(names(&top), ["description Declared in YIN", "leaf from-yang"]);
}

#[test]
fn test_find_module_picks_latest_revision() {
    let old = r#"module r { namespace "urn:r"; prefix r; revision 2020-01-01; }"#;
    let new = r#"module r { namespace "urn:r"; prefix r; revision 2021-06-30; revision 2020-01-01; }"#;
    let model = build(&[("r-old", old), ("r-new", new)]);

    assert_eq!(model.modules().len(), 2);
    let latest = model.find_module("r").unwrap();
    assert_eq!(latest.revision.as_ref().map(ToString::to_string).as_deref(), Some("2021-06-30"));
}
