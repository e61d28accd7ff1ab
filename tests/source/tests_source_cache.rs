//! SchemaSourceCache: on-demand derivation, sharing and failure handling.

use std::sync::Arc;
use std::thread;

use rstest::rstest;
use yangtree::source::{RepresentationKind, SchemaSource, SchemaSourceCache, SourceError, YangTextSource, YinXmlSource};
use yangtree::SourceIdentifier;

use crate::helpers::source_fixtures::{IMPORTED_MODULE, YIN_MODULE};

fn id(name: &str) -> SourceIdentifier {
    SourceIdentifier::new(name, None)
}

fn ast_of(source: SchemaSource) -> Arc<yangtree::source::AstSchemaSource> {
    match source {
        SchemaSource::YangAst(ast) => ast,
        other => panic!("Expected a YANG AST, got {:?}", other.kind()),
    }
}

#[test]
fn test_concurrent_get_derives_one_instance() {
    let cache = SchemaSourceCache::new();
    cache.put(YangTextSource::from_text("b.yang", IMPORTED_MODULE).unwrap());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| ast_of(cache.get(&id("b"), RepresentationKind::YangAst).unwrap().unwrap())))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|ast| Arc::ptr_eq(ast, &results[0])));
    let again = ast_of(cache.get(&id("b"), RepresentationKind::YangAst).unwrap().unwrap());
    assert!(Arc::ptr_eq(&again, &results[0]));
}

#[test]
fn test_failed_derivation_is_not_cached() {
    let cache = SchemaSourceCache::new();
    cache.put(YangTextSource::new(id("b"), "b.yang", "module b {"));

    let err = cache.get(&id("b"), RepresentationKind::YangAst).unwrap_err();
    assert!(matches!(err.root_cause(), SourceError::Syntax { .. }));
    assert!(cache.get(&id("b"), RepresentationKind::YangAst).is_err());

    // Replacing the text lets the next request derive again.
    cache.put(YangTextSource::new(id("b"), "b.yang", IMPORTED_MODULE));
    let ast = ast_of(cache.get(&id("b"), RepresentationKind::YangAst).unwrap().unwrap());
    assert_eq!(ast.dependency_info().name, "b");
}

#[test]
fn test_put_replaces_derived_variants() {
    let cache = SchemaSourceCache::new();
    cache.put(YangTextSource::new(id("b"), "b.yang", IMPORTED_MODULE));
    let first = ast_of(cache.get(&id("b"), RepresentationKind::YangAst).unwrap().unwrap());

    cache.put(YangTextSource::new(id("b"), "b.yang", IMPORTED_MODULE));
    let second = ast_of(cache.get(&id("b"), RepresentationKind::YangAst).unwrap().unwrap());
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_yin_dom_is_derived_from_xml() {
    let cache = SchemaSourceCache::new();
    cache.put(YinXmlSource::new(id("yb"), "yb.yin", YIN_MODULE));

    let Some(SchemaSource::YinDom(dom)) = cache.get(&id("yb"), RepresentationKind::YinDom).unwrap() else {
        panic!("Expected a YIN DOM");
    };
    assert_eq!(dom.document().unwrap().root().name(), "module");
}

#[rstest]
#[case::unknown_identifier("missing", RepresentationKind::YangAst)]
#[case::no_transformation("b", RepresentationKind::YinDom)]
fn test_get_without_usable_source(#[case] name: &str, #[case] kind: RepresentationKind) {
    let cache = SchemaSourceCache::new();
    cache.put(YangTextSource::new(id("b"), "b.yang", IMPORTED_MODULE));
    assert!(cache.get(&id(name), kind).unwrap().is_none());
}
