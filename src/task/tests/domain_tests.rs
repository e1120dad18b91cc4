//! Domain-focused tests for task values.

use crate::task::domain::{
    DerivedTask, DocumentName, FailureReason, ParseTaskStateError, TaskDomainError, TaskId,
    TaskState, TaskTypeName,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[rstest]
#[case("PENDING", TaskState::Pending)]
#[case("started", TaskState::Started)]
#[case(" Success ", TaskState::Success)]
#[case("failure", TaskState::Failure)]
fn task_state_parses_case_insensitively(#[case] raw: &str, #[case] expected: TaskState) {
    assert_eq!(TaskState::try_from(raw), Ok(expected));
}

#[rstest]
fn task_state_rejects_unknown_values() {
    assert_eq!(
        TaskState::try_from("RUNNING"),
        Err(ParseTaskStateError("RUNNING".to_owned()))
    );
}

#[rstest]
fn task_state_storage_form_round_trips() {
    for state in [
        TaskState::Pending,
        TaskState::Started,
        TaskState::Success,
        TaskState::Failure,
    ] {
        assert_eq!(TaskState::try_from(state.as_str()), Ok(state));
    }
}

#[rstest]
fn task_type_name_is_trimmed() {
    let name = TaskTypeName::new("  Data payload processing ").expect("valid name");
    assert_eq!(name.as_str(), "Data payload processing");
}

#[rstest]
#[case("")]
#[case("   ")]
fn task_type_name_rejects_blank_values(#[case] raw: &str) {
    assert_eq!(TaskTypeName::new(raw), Err(TaskDomainError::EmptyTaskTypeName));
}

#[rstest]
fn task_type_name_rejects_values_over_limit() {
    let long = "x".repeat(81);
    assert_eq!(
        TaskTypeName::new(long.clone()),
        Err(TaskDomainError::TaskTypeNameTooLong(long))
    );
    assert!(TaskTypeName::new("x".repeat(80)).is_ok());
}

#[rstest]
fn derived_task_rejects_self_loop(clock: DefaultClock) {
    let task = TaskId::new();
    assert_eq!(
        DerivedTask::new(task, task, &clock),
        Err(TaskDomainError::SelfReferentialDerivedTask(task))
    );
}

#[rstest]
fn derived_task_records_both_endpoints(clock: DefaultClock) {
    let parent = TaskId::new();
    let child = TaskId::new();
    let edge = DerivedTask::new(parent, child, &clock).expect("distinct endpoints");

    assert_eq!(edge.parent(), parent);
    assert_eq!(edge.child(), child);
}

#[rstest]
fn document_name_rejects_blank_values() {
    assert_eq!(DocumentName::new(" "), Err(TaskDomainError::EmptyDocumentName));
}

#[rstest]
fn failure_reason_renders_detail_after_summary() {
    let reason = FailureReason::new("stage exited with status 2").with_detail("stderr: boom");

    assert_eq!(
        reason.to_document_text(),
        "stage exited with status 2\n\nstderr: boom\n"
    );
    assert_eq!(reason.to_string(), "stage exited with status 2");
}
