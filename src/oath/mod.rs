//! YubiKey OATH accounts
//!
//! `OathClient` exposes the stateless operations; `AccountSession` keeps a
//! device selection and a resolved password across calls.

pub mod output_parser;
pub mod prompt;
pub mod retry;
pub mod session;

// Public re-exports
pub use output_parser::OutputParser;
pub use prompt::{PasswordPrompt, StaticPassword};
pub use retry::{AuthState, RetryEngine};
pub use session::AccountSession;

use crate::config::OathConfig;
use crate::error::OathError;
use crate::types::{DeviceSerial, OathCode, Password};
use crate::ykman::{CommandRunner, Invoker, Request, YkmanRunner};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Which YubiKey to use, can be omitted if only one is attached
    pub device: DeviceSerial,

    /// Password for the OATH application, can be omitted if not protected
    pub password: Option<Password>,
}

impl Options {
    pub fn device(device: DeviceSerial) -> Self {
        Self {
            device,
            password: None,
        }
    }

    pub fn with_password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }
}

/// Stateless entry point to the OATH operations
#[derive(Clone)]
pub struct OathClient<R = YkmanRunner> {
    engine: RetryEngine<R>,
    parser: OutputParser,
}

impl<R> fmt::Debug for OathClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OathClient").finish_non_exhaustive()
    }
}

impl OathClient<YkmanRunner> {
    /// Client running ykman as configured
    pub fn from_config(config: &OathConfig) -> Self {
        Self::new(YkmanRunner::from_config(config))
    }
}

impl Default for OathClient<YkmanRunner> {
    fn default() -> Self {
        Self::new(YkmanRunner::default())
    }
}

impl<R: CommandRunner> OathClient<R> {
    pub fn new(runner: R) -> Self {
        Self {
            engine: RetryEngine::new(Invoker::new(runner)),
            parser: OutputParser::new(),
        }
    }

    pub fn engine(&self) -> &RetryEngine<R> {
        &self.engine
    }

    pub fn parser(&self) -> &OutputParser {
        &self.parser
    }

    /// List the accounts configured in the OATH application
    pub async fn list(
        &self,
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, OathError> {
        let request = Request::list(options.device.clone()).with_password(options.password.clone());
        let output = self.engine.invoker().execute(&request, cancel).await?;
        Ok(self.parser.parse_lines(&output))
    }

    /// Generate a TOTP code for `account` (such as `"<issuer>:<name>"`)
    pub async fn code(
        &self,
        account: &str,
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<OathCode, OathError> {
        let request =
            Request::code(options.device.clone(), account).with_password(options.password.clone());
        let output = self.engine.invoker().execute(&request, cancel).await?;
        self.parser.parse_code(&output)
    }

    /// [`list`](Self::list), prompting for the password when required
    pub async fn list_with_prompt(
        &self,
        prompt: &dyn PasswordPrompt,
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, OathError> {
        let (accounts, _) = self.list_with_prompt_and_cache(prompt, options, cancel).await?;
        Ok(accounts)
    }

    /// [`list_with_prompt`](Self::list_with_prompt), also returning the
    /// password that unlocked the application, if one was needed
    pub async fn list_with_prompt_and_cache(
        &self,
        prompt: &dyn PasswordPrompt,
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<(Vec<String>, Option<Password>), OathError> {
        let request = Request::list(options.device.clone()).with_password(options.password.clone());
        let (output, state) = self.engine.run(request, prompt, cancel).await?;
        Ok((self.parser.parse_lines(&output), state.into_password()))
    }

    /// [`code`](Self::code), prompting for the password when required
    pub async fn code_with_prompt(
        &self,
        prompt: &dyn PasswordPrompt,
        account: &str,
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<OathCode, OathError> {
        let (code, _) = self
            .code_with_prompt_and_cache(prompt, account, options, cancel)
            .await?;
        Ok(code)
    }

    /// [`code_with_prompt`](Self::code_with_prompt), also returning the
    /// password that unlocked the application, if one was needed
    pub async fn code_with_prompt_and_cache(
        &self,
        prompt: &dyn PasswordPrompt,
        account: &str,
        options: &Options,
        cancel: &CancellationToken,
    ) -> Result<(OathCode, Option<Password>), OathError> {
        let request =
            Request::code(options.device.clone(), account).with_password(options.password.clone());
        let (output, state) = self.engine.run(request, prompt, cancel).await?;
        Ok((self.parser.parse_code(&output)?, state.into_password()))
    }
}
