//! Statement shapes: type bodies, skipped statements and argument checks.

use rstest::rstest;
use yangtree::model::{DeclarationError, EffectiveBuildError};
use yangtree::ReactorError;

use crate::helpers::reactor_helpers::{build, child, names, root, try_build};

#[test]
fn test_type_with_body_is_keyed_by_type_name() {
    let text = r#"
    module t {
        namespace "urn:test:t";
        prefix t;
        leaf count {
            type uint32 { range "1..10"; }
        }
        leaf name { type string; }
    }
    "#;
    let model = build(&[("t", text)]);
    let module = root(&model, "t");

    let count = child(module, "leaf", "count");
    assert_eq!(names(&count), ["uint32 uint32"]);
    let uint32 = count.find_first("uint32").unwrap();
    assert_eq!(uint32.declared().keyword().local_name(), "uint32");
    assert_eq!(uint32.find_first("range").and_then(|r| r.argument()), Some("1..10"));

    let name = child(module, "leaf", "name");
    assert_eq!(names(&name), ["type string"]);
}

#[test]
fn test_block_comments_are_skipped() {
    let text = r#"
    module t {
        /*
         * Header comment with a "quoted" word and ** stars.
         */
        namespace "urn:test:t";
        prefix t; /* trailing */
        container c { /* inline */ leaf l { type string; } }
    }
    "#;
    let model = build(&[("t", text)]);
    let c = child(root(&model, "t"), "container", "c");
    assert_eq!(names(&c), ["leaf l"]);
}

#[rstest]
#[case::unknown_prefix("zz:nothing \"x\" { leaf hidden { type string; } }")]
#[case::undefined_extension("t:nothing \"x\" { leaf hidden { type string; } }")]
#[case::unknown_keyword("nothing { leaf hidden { type string; } }")]
fn test_unsupported_subtree_is_skipped(#[case] statement: &str) {
    let text = format!(
        r#"module t {{
            namespace "urn:test:t";
            prefix t;
            container c {{
                {statement}
                leaf shown {{ type string; }}
            }}
        }}"#
    );
    let model = build(&[("t", text.as_str())]);
    let c = child(root(&model, "t"), "container", "c");

    assert_eq!(names(&c), ["leaf shown"]);
    assert!(c.unknown_substatements().unwrap().is_empty());
    assert_eq!(c.declared().substatements().len(), 1);
}

#[rstest]
#[case::missing_argument("container;", true)]
#[case::unexpected_argument("input i;", false)]
fn test_argument_shape_errors(#[case] statement: &str, #[case] missing: bool) {
    let text = format!(r#"module t {{ namespace "urn:test:t"; prefix t; {statement} }}"#);
    let err = try_build(&[("t", text.as_str())]).unwrap_err();
    let ReactorError::EffectiveBuild(EffectiveBuildError::Declaration { cause, .. }) = err else {
        panic!("Expected a declaration failure, got {}", err);
    };
    if missing {
        assert!(matches!(*cause, DeclarationError::MissingArgument { .. }));
    } else {
        assert!(matches!(*cause, DeclarationError::UnexpectedArgument { .. }));
    }
}
