use std::sync::Once;

use assist_core::{ControlKind, ControlPhase, ControlState, PROGRESS_SUFFIX};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(assist_logging::initialize_for_tests);
}

#[test]
fn begin_marks_busy_and_disables_pointer() {
    init_logging();
    let mut state = ControlState::for_kind(ControlKind::Reply);
    assert_eq!(state.phase(), ControlPhase::Idle);
    assert!(state.pointer_enabled());

    let busy_label = state.begin().expect("idle control can begin").to_string();
    assert_eq!(busy_label, format!("AI Reply{PROGRESS_SUFFIX}"));
    assert!(state.is_busy());
    assert!(!state.pointer_enabled());
}

#[test]
fn begin_while_busy_is_rejected_without_changing_label() {
    init_logging();
    let mut state = ControlState::for_kind(ControlKind::Summarize);
    state.begin().unwrap();
    let before = state.clone();

    assert!(state.begin().is_err());
    assert_eq!(state, before);
}

#[test]
fn finish_restores_the_exact_idle_state() {
    init_logging();
    let initial = ControlState::for_kind(ControlKind::Summarize);
    let mut state = initial.clone();

    state.begin().unwrap();
    assert_eq!(state.finish(), "Summarize");
    assert_eq!(state, initial);

    // A second finish while idle is a no-op.
    state.finish();
    assert_eq!(state, initial);
}

#[test]
fn control_kinds_have_distinct_markers_and_host_classes() {
    let reply = ControlKind::Reply.class_attribute();
    let summarize = ControlKind::Summarize.class_attribute();

    assert!(reply.starts_with("T-I J-J5-Ji aoO v7 T-I-atl L3 "));
    assert!(reply.ends_with("ai-reply-button"));
    assert!(summarize.ends_with("ai-summarize-button"));
    assert_eq!(ControlKind::ALL, [ControlKind::Reply, ControlKind::Summarize]);
}
