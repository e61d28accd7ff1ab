//! Derived representations are computed once per source instance and
//! shared by every caller, including concurrent ones.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use yangtree::SourceIdentifier;
use yangtree::source::{XmlTransformer, YangTextSource, YinDocument, YinDomSource, YinXmlSource};

use crate::helpers::source_fixtures::{IMPORTED_MODULE, YIN_MODULE};

#[test]
fn test_concurrent_to_ast_observes_one_instance() {
    let source = Arc::new(YangTextSource::from_text("b.yang", IMPORTED_MODULE).unwrap());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = source.clone();
                scope.spawn(move || source.to_ast().unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &results[0];
    assert!(results.iter().all(|ast| Arc::ptr_eq(ast, first)));
    assert_eq!(first.identifier(), &SourceIdentifier::new("b", None));
}

#[test]
fn test_failed_transform_is_memoized_per_instance() {
    let source = YangTextSource::new(SourceIdentifier::new("broken", None), "broken.yang", "module broken {");
    let first = source.to_ast().unwrap_err();
    let second = source.to_ast().unwrap_err();
    assert_eq!(first, second);
}

#[test]
fn test_lazy_dom_runs_transformer_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let transformer: XmlTransformer = Arc::new(move |xml: &YinXmlSource| {
        counter.fetch_add(1, Ordering::SeqCst);
        YinDocument::parse(xml.name(), xml.xml())
    });
    let xml = Arc::new(YinXmlSource::new(SourceIdentifier::new("yb", None), "yb.yin", YIN_MODULE));
    let dom = YinDomSource::lazy_transform_with(xml, transformer);
    assert!(!dom.is_transformed());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let documents: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dom = dom.clone();
                scope.spawn(move || dom.document().unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(dom.is_transformed());
    assert!(documents.iter().all(|d| Arc::ptr_eq(d, &documents[0])));
    assert_eq!(documents[0].root().attribute("name"), Some("yb"));
}

#[test]
fn test_to_dom_is_shared() {
    let xml = Arc::new(YinXmlSource::new(SourceIdentifier::new("yb", None), "yb.yin", YIN_MODULE));
    let first = xml.to_dom();
    let second = xml.to_dom();
    assert!(Arc::ptr_eq(&first, &second));
}
