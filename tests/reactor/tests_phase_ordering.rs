//! Phase barriers: out-of-order requests are rejected without poisoning the
//! session, and a driven batch builds the same model as `build()`.

use rstest::rstest;
use yangtree::reactor::{CopyKind, ReactorConfig, ReactorError};
use yangtree::ModelPhase;

use crate::helpers::reactor_helpers::{child, root, session_with};
use crate::helpers::source_fixtures::{IMPORTED_MODULE, IMPORTING_MODULE};

const BATCH: &[(&str, &str)] = &[("a", IMPORTING_MODULE), ("b", IMPORTED_MODULE)];

fn assert_value_copied(model: &yangtree::EffectiveModel) {
    let top = child(root(model, "a"), "container", "top");
    let value = child(&top, "leaf", "value");
    assert_eq!(value.copy_origin(), Some(CopyKind::AddedByUses));
    assert_eq!(value.namespace().as_ref(), "urn:test:a");
    assert!(top.find_first("uses").is_some());
}

#[rstest]
#[case::declaration_before_linkage(ModelPhase::FullDeclaration)]
#[case::definition_before_linkage(ModelPhase::StatementDefinition)]
fn test_advance_source_too_early(#[case] phase: ModelPhase) {
    let (mut session, ids) = session_with(BATCH, ReactorConfig::default());

    let err = session.advance_source(ids[0], phase).unwrap_err();
    match err {
        ReactorError::PhaseOrder {
            requested,
            name,
            reached,
            batch,
        } => {
            assert_eq!(requested, phase);
            assert_eq!(name, "a");
            assert_eq!(reached, ModelPhase::Registered);
            assert_eq!(batch, ModelPhase::Registered);
        }
        other => panic!("Expected PhaseOrder, got {}", other),
    }

    assert_eq!(session.source_phase(ids[0]), Some(ModelPhase::Registered));
    let model = session.build().unwrap();
    assert_value_copied(&model);
}

#[rstest]
#[case::effective_model(ModelPhase::EffectiveModel)]
#[case::full_declaration(ModelPhase::FullDeclaration)]
fn test_complete_phase_out_of_order(#[case] phase: ModelPhase) {
    let (mut session, _) = session_with(BATCH, ReactorConfig::default().with_parallel(false));

    let err = session.complete_phase(phase).unwrap_err();
    assert!(matches!(err, ReactorError::PhaseOrder { requested, .. } if requested == phase));
    assert_eq!(session.phase(), ModelPhase::Registered);

    let model = session.build().unwrap();
    assert_value_copied(&model);
}

#[rstest]
#[case::sequential(false)]
#[case::parallel(true)]
fn test_drive_phases_one_by_one(#[case] parallel: bool) {
    let (mut session, ids) = session_with(BATCH, ReactorConfig::default().with_parallel(parallel));

    // Per-source work may run ahead of the barrier for the next phase only.
    session.advance_source(ids[1], ModelPhase::SourceLinkage).unwrap();
    assert_eq!(session.source_phase(ids[1]), Some(ModelPhase::SourceLinkage));
    assert_eq!(session.source_phase(ids[0]), Some(ModelPhase::Registered));
    assert!(session.advance_source(ids[1], ModelPhase::StatementDefinition).is_err());

    for phase in ModelPhase::ALL.into_iter().skip(1) {
        session.complete_phase(phase).unwrap();
        assert_eq!(session.phase(), phase);
        // Completing a phase twice is a no-op.
        session.complete_phase(phase).unwrap();
    }
    assert!(ids
        .iter()
        .all(|id| session.source_phase(*id) >= Some(ModelPhase::FullDeclaration)));

    let model = session.build().unwrap();
    assert_value_copied(&model);
}

#[test]
fn test_add_source_after_registration() {
    let (mut session, _) = session_with(BATCH, ReactorConfig::default());
    session.complete_phase(ModelPhase::SourceLinkage).unwrap();

    let late = crate::helpers::reactor_helpers::ast("c", "module c { namespace urn:c; prefix c; }");
    let err = session.add_source("c", late).unwrap_err();
    assert!(matches!(err, ReactorError::PhaseOrder { requested: ModelPhase::Registered, .. }));
    assert_eq!(session.len(), 2);
}

#[test]
fn test_phase_failure_is_sticky() {
    let (mut session, _) = session_with(&[("a", IMPORTING_MODULE)], ReactorConfig::default());

    let first = session.complete_phase(ModelPhase::SourceLinkage).unwrap_err();
    assert!(matches!(first, ReactorError::Linkage(_)));
    let second = session.complete_phase(ModelPhase::SourceLinkage).unwrap_err();
    assert_eq!(first, second);
    assert_eq!(session.build().unwrap_err(), first);
}
