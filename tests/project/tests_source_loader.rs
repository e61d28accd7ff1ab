//! Loading a directory of sources and building it as one batch.

use std::fs;

use tempfile::TempDir;
use yangtree::project::SourceLoader;
use yangtree::reactor::CopyKind;
use yangtree::{ReactorConfig, SourceIdentifier, StatementReactor};

use crate::helpers::reactor_helpers::child;
use crate::helpers::source_fixtures::{AUGMENTS_YIN_MODULE, CHILD_SUBMODULE, PARENT_MODULE, YIN_MODULE};

fn write_sources(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

#[test]
fn test_load_and_build_directory() {
    let dir = write_sources(&[
        ("parent.yang", PARENT_MODULE),
        ("sub/child.yang", CHILD_SUBMODULE),
        ("notes.txt", "not a schema source"),
    ]);

    let loader = SourceLoader::new();
    let mut loaded = loader.load_directory(dir.path()).unwrap();
    loaded.sort();
    assert_eq!(
        loaded,
        vec![SourceIdentifier::new("child", None), SourceIdentifier::new("parent", None)]
    );

    let model = loader.build(&StatementReactor::new(ReactorConfig::default())).unwrap();
    let module = model.find_module("parent").unwrap();
    assert_eq!(module.submodules.len(), 1);
    let assembled = child(&module.root, "container", "from-child");
    assert_eq!(assembled.copy_origin(), Some(CopyKind::Include));
}

#[test]
fn test_load_yin_and_yang() {
    let dir = write_sources(&[("yb.yin", YIN_MODULE), ("ya.yang", AUGMENTS_YIN_MODULE)]);

    let loader = SourceLoader::new();
    loader.load_directory(dir.path()).unwrap();
    assert_eq!(loader.cache().len(), 2);

    let model = loader.build(&StatementReactor::default()).unwrap();
    let top = child(model.get(&SourceIdentifier::new("yb", None)).unwrap(), "container", "top");
    assert_eq!(child(&top, "leaf", "from-yang").copy_origin(), Some(CopyKind::Augmentation));
}

#[test]
fn test_load_file_then_build_reports_missing_import() {
    let dir = write_sources(&[("ya.yang", AUGMENTS_YIN_MODULE)]);

    let loader = SourceLoader::new();
    let identifier = loader.load_file(dir.path().join("ya.yang")).unwrap();
    assert_eq!(identifier.name(), "ya");
    assert!(loader.build(&StatementReactor::default()).is_err());
}
