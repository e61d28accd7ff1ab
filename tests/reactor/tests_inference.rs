//! Cross-reference inference: augments, deviations, refines, features and
//! the errors they raise.

use rstest::rstest;
use yangtree::reactor::{CopyKind, ReactorConfig, ReactorError};
use yangtree::QName;

use crate::helpers::reactor_helpers::{build, child, find_child, names, root, try_build, try_build_with};
use crate::helpers::source_fixtures::{AUGMENTING_MODULE, AUGMENT_BASE, DEVIATING_MODULE};

fn inference_message(result: Result<yangtree::EffectiveModel, ReactorError>) -> String {
    match result {
        Err(ReactorError::Inference { message, .. }) => message,
        Err(other) => panic!("Expected an inference error, got {}", other),
        Ok(_) => panic!("Expected an inference error, build succeeded"),
    }
}

#[test]
fn test_augment_of_augmented_node() {
    let model = build(&[("aug", AUGMENTING_MODULE), ("base", AUGMENT_BASE)]);
    let top = child(root(&model, "base"), "container", "top");

    let inner = child(&top, "container", "inner");
    assert_eq!(inner.copy_origin(), Some(CopyKind::Augmentation));
    assert_eq!(inner.namespace().as_ref(), "urn:test:aug");

    let deep = child(&inner, "leaf", "deep");
    assert_eq!(deep.copy_origin(), Some(CopyKind::Augmentation));
    assert_eq!(deep.namespace().as_ref(), "urn:test:aug");

    // The augment's own description stays with the augment.
    assert!(top.find_first("description").is_none());
}

#[test]
fn test_augment_rounds_are_bounded() {
    let config = ReactorConfig::default().with_parallel(false).with_max_inference_rounds(1);
    let message = inference_message(try_build_with(&[("aug", AUGMENTING_MODULE), ("base", AUGMENT_BASE)], config));
    assert!(message.contains("/b:top/x:inner"), "{}", message);
}

#[test]
fn test_deviations() {
    let model = build(&[("base", AUGMENT_BASE), ("dev", DEVIATING_MODULE)]);
    let top = child(root(&model, "base"), "container", "top");

    assert!(find_child(&top, "leaf", "removable").is_none());
    assert!(find_child(&top, "leaf", "kept").is_some());

    let retyped = child(&top, "leaf", "retyped");
    // Types without a body keep the `type` keyword.
    let types: Vec<_> = retyped.find_all("type").collect();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].argument(), Some("int32"));
    assert_eq!(types[0].copy_origin(), Some(CopyKind::Deviation));
}

#[test]
fn test_deviate_add_and_delete() {
    let dev = r#"
    module dev {
        namespace "urn:test:dev";
        prefix d;
        import base { prefix b; }
        deviation "/b:top/b:kept" {
            deviate add { default "x"; }
        }
        deviation "/b:top/b:removable" {
            deviate delete { type string; }
        }
    }
    "#;
    let model = build(&[("base", AUGMENT_BASE), ("dev", dev)]);
    let top = child(root(&model, "base"), "container", "top");

    let kept = child(&top, "leaf", "kept");
    assert_eq!(kept.find_first("default").and_then(|d| d.argument()), Some("x"));

    let removable = child(&top, "leaf", "removable");
    assert!(removable.find_first("type").is_none());
}

#[rstest]
#[case::replace("deviate replace { type string; }", &["type string"])]
#[case::replace_with_body("deviate replace { type int8 { range \"0..5\"; } }", &["int8 int8"])]
#[case::delete("deviate delete { type uint32; }", &[])]
fn test_deviate_matches_type_with_body(#[case] deviate: &str, #[case] expected: &[&str]) {
    let text = format!(
        r#"module d {{
            namespace "urn:test:d";
            prefix d;
            container c {{
                leaf l {{ type uint32 {{ range "1..10"; }} }}
            }}
            deviation "/d:c/d:l" {{ {deviate} }}
        }}"#
    );
    let model = build(&[("d", text.as_str())]);
    let l = child(&child(root(&model, "d"), "container", "c"), "leaf", "l");
    assert_eq!(names(&l), expected);
}

#[test]
fn test_refine_replaces_type_with_body() {
    let text = r#"
    module r {
        namespace "urn:test:r";
        prefix r;
        grouping g {
            leaf x { type uint32 { range "1..10"; } }
        }
        container c {
            uses g {
                refine x { type string; }
            }
        }
    }
    "#;
    let model = build(&[("r", text)]);
    let x = child(&child(root(&model, "r"), "container", "c"), "leaf", "x");
    assert_eq!(names(&x), ["type string"]);
}

#[test]
fn test_refine_replaces_default() {
    let text = r#"
    module r {
        namespace "urn:test:r";
        prefix r;
        grouping g {
            leaf x { type string; default "a"; }
        }
        container c {
            uses g {
                refine x { default "b"; }
            }
        }
    }
    "#;
    let model = build(&[("r", text)]);
    let x = child(&child(root(&model, "r"), "container", "c"), "leaf", "x");

    let defaults: Vec<_> = x.find_all("default").collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].argument(), Some("b"));
    assert_eq!(defaults[0].copy_origin(), Some(CopyKind::Refinement));

    // The grouping itself is untouched.
    let original = child(&child(root(&model, "r"), "grouping", "g"), "leaf", "x");
    assert_eq!(original.find_first("default").and_then(|d| d.argument()), Some("a"));
}

#[rstest]
#[case::all_features_supported(ReactorConfig::default(), true)]
#[case::fancy_supported(
    ReactorConfig::default().with_supported_features([QName::new("urn:test:base", "fancy")]),
    true
)]
#[case::no_features_supported(ReactorConfig::default().with_supported_features(Vec::<QName>::new()), false)]
fn test_if_feature_pruning(#[case] config: ReactorConfig, #[case] kept: bool) {
    let model = try_build_with(&[("base", AUGMENT_BASE)], config).unwrap();
    let top = child(root(&model, "base"), "container", "top");
    assert_eq!(find_child(&top, "container", "optional").is_some(), kept);
    assert!(find_child(&top, "leaf", "kept").is_some());
}

#[rstest]
#[case::undefined_feature(
    r#"module f { namespace "urn:f"; prefix f; container c { if-feature missing; } }"#,
    "feature 'missing' is not defined"
)]
#[case::recursive_grouping(
    r#"module g { namespace "urn:g"; prefix g;
        grouping loop { container again { uses loop; } }
        container top { uses loop; } }"#,
    "recursive use of grouping"
)]
#[case::missing_grouping(
    r#"module m { namespace "urn:m"; prefix m; container top { uses nowhere; } }"#,
    "grouping 'nowhere' not found"
)]
#[case::unresolved_augment(
    r#"module u { namespace "urn:u"; prefix u; augment "/u:nothing" { leaf l { type string; } } }"#,
    "augment target '/u:nothing' not found"
)]
#[case::unresolved_deviation(
    r#"module d { namespace "urn:d"; prefix d; deviation "/d:nothing" { deviate not-supported; } }"#,
    "deviation target '/d:nothing' not found"
)]
fn test_inference_errors(#[case] text: &str, #[case] expected: &str) {
    let message = inference_message(try_build(&[("m", text)]));
    assert!(message.contains(expected), "'{}' does not contain '{}'", message, expected);
}
