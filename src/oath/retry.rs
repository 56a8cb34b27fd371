//! Two-phase password resolution
//!
//! Every OATH operation is first attempted without a password. Only when
//! ykman reports that the application is password protected is the prompt
//! consulted, followed by exactly one more attempt with its answer.

use crate::error::OathError;
use crate::oath::prompt::PasswordPrompt;
use crate::types::Password;
use crate::ykman::{CommandRunner, Invoker, Request, YkmanRunner};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Authentication state reached by an operation
#[derive(Debug, Clone, Default)]
pub enum AuthState {
    /// No password was needed, or none has worked yet
    #[default]
    Unauthenticated,
    /// This password unlocked the OATH application
    Authenticated(Password),
}

impl AuthState {
    pub fn password(&self) -> Option<&Password> {
        match self {
            AuthState::Authenticated(password) => Some(password),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn into_password(self) -> Option<Password> {
        match self {
            AuthState::Authenticated(password) => Some(password),
            AuthState::Unauthenticated => None,
        }
    }
}

/// Runs requests with the prompt-and-retry protocol
#[derive(Debug, Clone, Default)]
pub struct RetryEngine<R = YkmanRunner> {
    invoker: Invoker<R>,
}

impl<R: CommandRunner> RetryEngine<R> {
    pub fn new(invoker: Invoker<R>) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &Invoker<R> {
        &self.invoker
    }

    /// Run `request`, prompting for a password if ykman asks for one
    ///
    /// Returns ykman's stdout together with the state that produced it:
    /// `Authenticated` carries the prompted password so callers can cache it.
    /// An empty prompted password never yields `Authenticated`.
    ///
    /// # Errors
    ///
    /// - `PasswordPromptConflict` if `request` already carries a password;
    ///   nothing is invoked in that case
    /// - the prompt's own error, unchanged, if prompting fails
    /// - `Cancelled` if `cancel` fires while prompting
    /// - any classification of the final attempt, including a second
    ///   `PasswordRequired`
    pub async fn run(
        &self,
        request: Request,
        prompt: &dyn PasswordPrompt,
        cancel: &CancellationToken,
    ) -> Result<(String, AuthState), OathError> {
        if request.has_password() {
            return Err(OathError::PasswordPromptConflict);
        }

        match self.invoker.execute(&request, cancel).await {
            Err(OathError::PasswordRequired) => {}
            other => return other.map(|output| (output, AuthState::Unauthenticated)),
        }

        debug!("OATH application is password protected, prompting for password");

        let password = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OathError::Cancelled),
            answer = prompt.prompt(cancel) => answer?,
        };

        if cancel.is_cancelled() {
            return Err(OathError::Cancelled);
        }

        let request = request.with_password(Some(password.clone()));
        let output = self.invoker.execute(&request, cancel).await?;

        // An empty answer is sent as "no password" and unlocks nothing
        if password.is_empty() {
            return Ok((output, AuthState::Unauthenticated));
        }

        info!("OATH application unlocked with prompted password");
        Ok((output, AuthState::Authenticated(password)))
    }
}
