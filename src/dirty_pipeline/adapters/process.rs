//! Stage runner spawning operating system processes.

use crate::dirty_pipeline::{
    domain::{StageInvocation, StageOutput},
    ports::{StageRunner, StageRunnerError, StageRunnerResult},
};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs stages with `tokio::process`, capturing both output streams.
#[derive(Debug, Clone, Default)]
pub struct ProcessStageRunner {
    working_dir: Option<Utf8PathBuf>,
}

impl ProcessStageRunner {
    /// Creates a runner using the worker's current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every stage from `dir`.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl StageRunner for ProcessStageRunner {
    async fn run(&self, invocation: &StageInvocation) -> StageRunnerResult<StageOutput> {
        debug!(stage = %invocation.stage, command = %invocation.command_line(), "spawning stage");
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|err| StageRunnerError::Spawn {
                program: invocation.program.clone(),
                reason: err.to_string(),
            })?;
        Ok(StageOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn invocation(program: &str, args: &[&str]) -> StageInvocation {
        StageInvocation {
            stage: "probe".to_owned(),
            program: program.to_owned(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
        }
    }

    #[cfg(unix)]
    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn captures_streams_and_exit_code() {
        let runner = ProcessStageRunner::new();

        let output = runner
            .run(&invocation("sh", &["-c", "echo out; echo err >&2; exit 3"]))
            .await
            .expect("sh should be available");

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(!output.succeeded());
    }

    #[cfg(unix)]
    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn runs_in_the_configured_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        let runner = ProcessStageRunner::new().with_working_dir(path.clone());

        let output = runner
            .run(&invocation("pwd", &[]))
            .await
            .expect("pwd should run");

        assert!(output.succeeded());
        assert!(output.stdout.trim_end().ends_with(
            path.file_name().expect("temp dir has a name")
        ));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn missing_program_is_a_spawn_error() {
        let runner = ProcessStageRunner::new();

        let result = runner
            .run(&invocation("emikg-no-such-program", &[]))
            .await;

        assert!(matches!(
            result,
            Err(StageRunnerError::Spawn { ref program, .. }) if program == "emikg-no-such-program"
        ));
    }
}
