//! Tests for stage definitions and argument rendering.

use crate::dirty_pipeline::domain::{
    DirtyPipelineDomainError, PipelineStage, StageContext, StageInvocation, StageOutput,
    default_stages, validate_stages,
};
use crate::payload::domain::DataPayload;
use crate::task::domain::{ActorId, TaskId};
use camino::Utf8Path;
use mockable::DefaultClock;
use rstest::rstest;
use std::collections::HashSet;

fn stage(name: &str, args: &[&str]) -> PipelineStage {
    PipelineStage {
        name: name.to_owned(),
        task_type: format!("{name} type"),
        description: String::new(),
        program: "python3".to_owned(),
        args: args.iter().map(|arg| (*arg).to_owned()).collect(),
    }
}

#[rstest]
fn default_pipeline_has_eighteen_distinct_stages() {
    let stages = default_stages();

    assert_eq!(stages.len(), 18);
    assert_eq!(validate_stages(&stages), Ok(()));
    let task_types: HashSet<&str> = stages.iter().map(|found| found.task_type.as_str()).collect();
    assert_eq!(task_types.len(), 18);
    assert_eq!(
        stages.get(4).map(|found| found.task_type.as_str()),
        Some("Massive ID")
    );
}

#[rstest]
#[case(Vec::new(), Err(DirtyPipelineDomainError::EmptyPipeline))]
#[case(
    vec![stage("a", &[]), stage("a", &[])],
    Err(DirtyPipelineDomainError::DuplicateStage("a".to_owned()))
)]
#[case(
    vec![PipelineStage { program: "  ".to_owned(), ..stage("b", &[]) }],
    Err(DirtyPipelineDomainError::MissingProgram("b".to_owned()))
)]
#[case(vec![stage("a", &[]), stage("b", &[])], Ok(()))]
fn stage_list_validation(
    #[case] stages: Vec<PipelineStage>,
    #[case] expected: Result<(), DirtyPipelineDomainError>,
) {
    assert_eq!(validate_stages(&stages), expected);
}

#[rstest]
fn arguments_render_payload_and_task_values() {
    let payload = DataPayload::new(
        ActorId::new(),
        TaskId::new(),
        Utf8Path::new("/payloads"),
        &DefaultClock,
    );
    let task = TaskId::new();
    let context = StageContext::new(payload.clone(), task, payload.task());

    let invocation = stage(
        "organize",
        &["run.py", "--in", "{{ payload_path }}", "--id={{ payload_id }}", "{{ task_id }}"],
    )
    .render(&context)
    .expect("templates should render");

    assert_eq!(invocation.stage, "organize");
    assert_eq!(
        invocation.args,
        vec![
            "run.py".to_owned(),
            "--in".to_owned(),
            format!("/payloads/{}", payload.id()),
            format!("--id={}", payload.id()),
            task.to_string(),
        ]
    );
}

#[rstest]
fn malformed_template_names_the_stage() {
    let payload = DataPayload::new(
        ActorId::new(),
        TaskId::new(),
        Utf8Path::new("/payloads"),
        &DefaultClock,
    );
    let context = StageContext::new(payload.clone(), TaskId::new(), payload.task());

    let result = stage("broken", &["{{ payload_path"]).render(&context);

    assert!(matches!(
        result,
        Err(DirtyPipelineDomainError::TemplateRender { ref stage, .. }) if stage == "broken"
    ));
}

#[rstest]
fn failure_reason_carries_captured_output() {
    let invocation = StageInvocation {
        stage: "massive_id".to_owned(),
        program: "python3".to_owned(),
        args: vec!["fetch.py".to_owned()],
    };
    let output = StageOutput {
        exit_code: Some(2),
        stdout: "contacting MassIVE".to_owned(),
        stderr: "connection refused".to_owned(),
    };

    let reason = output.failure_reason(&invocation);

    assert!(!output.succeeded());
    assert_eq!(reason.summary(), "stage massive_id exited with status 2");
    let detail = reason.detail().expect("detail should be recorded");
    assert!(detail.contains("python3 fetch.py"));
    assert!(detail.contains("contacting MassIVE"));
    assert!(detail.contains("connection refused"));
}
