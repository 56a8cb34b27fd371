// Shared test helpers: a CommandRunner that replays scripted ykman results

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use ykoath::ykman::classifier::MSG_WRONG_PASSWORD;
use ykoath::ykman::{CommandRunner, RawOutput, Termination};

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub args: Vec<String>,
    pub stdin: String,
}

/// Scripted response for one invocation
pub enum Step {
    Output(RawOutput),
    SpawnError(io::ErrorKind),
}

impl Step {
    pub fn ok(stdout: &str) -> Self {
        Step::Output(RawOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            termination: Termination::Exited(0),
        })
    }

    pub fn fail(stderr: &str) -> Self {
        Step::Output(RawOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            termination: Termination::Exited(2),
        })
    }

    pub fn wrong_password() -> Self {
        Self::fail(&format!("Error: {}\n", MSG_WRONG_PASSWORD))
    }

    pub fn signaled(signal: i32) -> Self {
        Step::Output(RawOutput {
            stdout: String::new(),
            stderr: String::new(),
            termination: Termination::Signaled(signal),
        })
    }
}

#[derive(Default)]
struct Inner {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
}

/// Replays steps in order and records every call
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    inner: Arc<Inner>,
}

impl ScriptedRunner {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            inner: Arc::new(Inner {
                steps: Mutex::new(steps.into()),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        args: &[String],
        stdin: &[u8],
        _cancel: &CancellationToken,
    ) -> io::Result<RawOutput> {
        self.inner.calls.lock().unwrap().push(Call {
            args: args.to_vec(),
            stdin: String::from_utf8_lossy(stdin).into_owned(),
        });

        let step = self
            .inner
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedRunner ran out of steps");

        match step {
            Step::Output(output) => Ok(output),
            Step::SpawnError(kind) => Err(io::Error::from(kind)),
        }
    }
}

pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
