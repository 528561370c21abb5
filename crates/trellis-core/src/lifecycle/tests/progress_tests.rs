#![cfg(test)]

use crate::lifecycle::progress::{OperationHandle, OperationOutcome};
use crate::lifecycle::state::PluginAction;
use crate::lifecycle::steps::{StepFailure, StepState, INSTALL_STEPS};

fn handle() -> OperationHandle {
    OperationHandle::new("op-1", "crm-sync", PluginAction::Install, INSTALL_STEPS)
}

#[test]
fn test_new_handle_all_steps_pending() {
    let handle = handle();
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.op_id, "op-1");
    assert_eq!(snapshot.plugin_id, "crm-sync");
    assert_eq!(snapshot.steps.len(), INSTALL_STEPS.len());
    assert_eq!(snapshot.outcome, OperationOutcome::Running);
    for (index, step) in snapshot.steps.iter().enumerate() {
        assert_eq!(step.number, index + 1);
        assert_eq!(step.name, INSTALL_STEPS[index]);
        assert_eq!(step.state, StepState::Pending);
    }
}

#[test]
fn test_step_progression_to_success() {
    let handle = handle();
    for index in 0..INSTALL_STEPS.len() {
        handle.begin_step(index);
        assert_eq!(handle.snapshot().steps[index].state, StepState::Running);
        handle.complete_step(index, format!("{} done", INSTALL_STEPS[index]));
    }
    handle.mark_succeeded();

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.outcome, OperationOutcome::Succeeded);
    assert!(snapshot.steps.iter().all(|s| s.state == StepState::Complete));
    assert!(snapshot.steps.iter().all(|s| s.detail.is_some()));
}

#[test]
fn test_failure_skips_remaining_steps() {
    let handle = handle();
    handle.begin_step(0);
    handle.complete_step(0, "ok".to_string());
    handle.begin_step(1);
    handle.fail_step(1, &StepFailure::with_suggestion("schema clash", "rename the table"));
    handle.skip_remaining(2);

    let snapshot = handle.snapshot();
    assert_eq!(
        snapshot.outcome,
        OperationOutcome::Failed {
            step: INSTALL_STEPS[1].to_string(),
            message: "schema clash".to_string(),
        }
    );
    let failed = snapshot.failed_step().unwrap();
    assert_eq!(failed.number, 2);
    assert_eq!(failed.error_message.as_deref(), Some("schema clash"));
    assert_eq!(failed.error_suggestion.as_deref(), Some("rename the table"));
    assert!(snapshot.steps[2..].iter().all(|s| s.state == StepState::Skipped));
}

#[test]
fn test_cancel_flag_and_cancelled_outcome() {
    let handle = handle();
    assert!(!handle.is_cancel_requested());
    handle.request_cancel();
    assert!(handle.is_cancel_requested());

    handle.begin_step(0);
    handle.complete_step(0, "ok".to_string());
    handle.skip_remaining(1);
    handle.mark_cancelled();

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.outcome, OperationOutcome::Cancelled);
    assert_eq!(snapshot.steps[0].state, StepState::Complete);
    assert!(snapshot.steps[1..].iter().all(|s| s.state == StepState::Skipped));
}

#[test]
fn test_snapshot_is_detached() {
    let handle = handle();
    let before = handle.snapshot();
    handle.begin_step(0);
    assert_eq!(before.steps[0].state, StepState::Pending);
    assert_eq!(handle.snapshot().steps[0].state, StepState::Running);
}

#[test]
fn test_outcome_serializes_with_status_tag() {
    let json = serde_json::to_value(OperationOutcome::Failed {
        step: "migrate schema".to_string(),
        message: "boom".to_string(),
    })
    .unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["step"], "migrate schema");

    let json = serde_json::to_value(OperationOutcome::Succeeded).unwrap();
    assert_eq!(json["status"], "succeeded");
}
