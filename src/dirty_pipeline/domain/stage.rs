//! Stage definitions, rendered invocations, and captured process output.

use super::DirtyPipelineDomainError;
use crate::payload::domain::DataPayload;
use crate::task::domain::{FailureReason, TaskId};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One external process in the pipeline.
///
/// Arguments are `minijinja` templates rendered against a [`StageContext`]:
/// `payload_id`, `payload_path`, `task_id` and `parent_task_id` are
/// available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    /// Unique stage name.
    pub name: String,
    /// Task type recording runs of this stage.
    pub task_type: String,
    /// Description stored with the task type.
    #[serde(default)]
    pub description: String,
    /// Executable to run.
    pub program: String,
    /// Argument templates.
    #[serde(default)]
    pub args: Vec<String>,
}

impl PipelineStage {
    /// Renders the argument templates for one run.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyPipelineDomainError::TemplateRender`] when a template
    /// is malformed.
    pub fn render(
        &self,
        context: &StageContext,
    ) -> Result<StageInvocation, DirtyPipelineDomainError> {
        let environment = Environment::new();
        let values = context.to_template_values();
        let args = self
            .args
            .iter()
            .map(|template| {
                environment.render_str(template, &values).map_err(|error| {
                    DirtyPipelineDomainError::TemplateRender {
                        stage: self.name.clone(),
                        reason: error.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StageInvocation {
            stage: self.name.clone(),
            program: self.program.clone(),
            args,
        })
    }
}

/// Values available to argument templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageContext {
    payload: DataPayload,
    task: TaskId,
    parent_task: TaskId,
}

impl StageContext {
    /// Creates the context for running a stage on `payload`.
    #[must_use]
    pub const fn new(payload: DataPayload, task: TaskId, parent_task: TaskId) -> Self {
        Self {
            payload,
            task,
            parent_task,
        }
    }

    fn to_template_values(&self) -> Map<String, Value> {
        let mut values = Map::new();
        values.insert(
            "payload_id".to_owned(),
            Value::String(self.payload.id().to_string()),
        );
        values.insert(
            "payload_path".to_owned(),
            Value::String(self.payload.path().to_string()),
        );
        values.insert("task_id".to_owned(), Value::String(self.task.to_string()));
        values.insert(
            "parent_task_id".to_owned(),
            Value::String(self.parent_task.to_string()),
        );
        values
    }
}

/// Fully rendered process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    /// Stage being run.
    pub stage: String,
    /// Executable.
    pub program: String,
    /// Rendered arguments.
    pub args: Vec<String>,
}

impl StageInvocation {
    /// Returns the invocation as a shell-like command line for logs.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status and captured streams of a finished stage process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl StageOutput {
    /// Returns whether the process exited with code zero.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Builds the failure reason recorded on the stage task.
    #[must_use]
    pub fn failure_reason(&self, invocation: &StageInvocation) -> FailureReason {
        let status = self
            .exit_code
            .map_or_else(|| "was terminated by a signal".to_owned(), |code| {
                format!("exited with status {code}")
            });
        FailureReason::new(format!("stage {} {status}", invocation.stage)).with_detail(format!(
            "command: {}\n\n--- stdout ---\n{}\n--- stderr ---\n{}",
            invocation.command_line(),
            self.stdout,
            self.stderr
        ))
    }
}
