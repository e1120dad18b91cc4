//! Scripted stage runner for tests and dry runs.

use crate::dirty_pipeline::{
    domain::{StageInvocation, StageOutput},
    ports::{StageRunner, StageRunnerError, StageRunnerResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Scripted result for one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Script {
    Exit(StageOutput),
    SpawnError(String),
}

/// Stage runner that succeeds unless a stage has been scripted otherwise,
/// and records every invocation it receives.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStageRunner {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    invocations: Arc<Mutex<Vec<StageInvocation>>>,
}

impl ScriptedStageRunner {
    /// Creates a runner where every stage succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `stage` exit with `exit_code` and the given stderr.
    #[must_use]
    pub fn failing_stage(self, stage: &str, exit_code: i32, stderr: &str) -> Self {
        self.script(
            stage,
            Script::Exit(StageOutput {
                exit_code: Some(exit_code),
                stdout: String::new(),
                stderr: stderr.to_owned(),
            }),
        )
    }

    /// Makes `stage` fail to spawn.
    #[must_use]
    pub fn unspawnable_stage(self, stage: &str, reason: &str) -> Self {
        self.script(stage, Script::SpawnError(reason.to_owned()))
    }

    /// Returns the invocations received so far, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<StageInvocation> {
        self.invocations
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    fn script(self, stage: &str, script: Script) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(stage.to_owned(), script);
        }
        self
    }
}

fn lock_error(invocation: &StageInvocation, err: &impl ToString) -> StageRunnerError {
    StageRunnerError::Spawn {
        program: invocation.program.clone(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl StageRunner for ScriptedStageRunner {
    async fn run(&self, invocation: &StageInvocation) -> StageRunnerResult<StageOutput> {
        self.invocations
            .lock()
            .map_err(|err| lock_error(invocation, &err))?
            .push(invocation.clone());
        let scripted = self
            .scripts
            .lock()
            .map_err(|err| lock_error(invocation, &err))?
            .get(&invocation.stage)
            .cloned();

        match scripted {
            None => Ok(StageOutput {
                exit_code: Some(0),
                stdout: format!("{} done\n", invocation.stage),
                stderr: String::new(),
            }),
            Some(Script::Exit(output)) => Ok(output),
            Some(Script::SpawnError(reason)) => Err(StageRunnerError::Spawn {
                program: invocation.program.clone(),
                reason,
            }),
        }
    }
}
