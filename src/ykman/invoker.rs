//! Single ykman invocation
//!
//! Builds the arguments, runs ykman once and classifies the result. No
//! retries happen at this layer.

use crate::error::OathError;
use crate::ykman::args::{build_args, redacted_args, Request};
use crate::ykman::classifier::{classify, classify_spawn_error};
use crate::ykman::runner::{CommandRunner, YkmanRunner};
use tokio_util::sync::CancellationToken;

/// Executes ykman requests through a [`CommandRunner`]
#[derive(Debug, Clone, Default)]
pub struct Invoker<R = YkmanRunner> {
    runner: R,
}

impl<R: CommandRunner> Invoker<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run one request and return ykman's stdout on success
    ///
    /// The password is passed both as `--password` and on stdin followed by a
    /// newline, since ykman versions differ in which one they read.
    pub async fn execute(
        &self,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<String, OathError> {
        let args = build_args(request);
        let password_supplied = request.has_password();
        let stdin = match &request.password {
            Some(password) => format!("{}\n", password.expose()),
            None => "\n".to_string(),
        };

        tracing::debug!("Running ykman {}", redacted_args(request).join(" "));

        let output = match self.runner.run(&args, stdin.as_bytes(), cancel).await {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("ykman could not be started: {}", e);
                return Err(classify_spawn_error(e));
            }
        };

        match classify(output.termination.into(), &output.stderr, password_supplied) {
            None => Ok(output.stdout),
            Some(error) => {
                tracing::debug!(
                    "ykman {} failed ({:?}): {}",
                    request.action,
                    output.termination,
                    error
                );
                Err(error)
            }
        }
    }
}
