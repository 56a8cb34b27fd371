//! Password prompt contract
//!
//! The prompt itself (terminal, GUI, keyring...) is supplied by the caller.
//! It is only consulted once ykman reports that a password is required.

use crate::error::OathError;
use crate::types::Password;
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Source of the OATH application password, asked on demand
///
/// Implementations should return promptly once `cancel` fires.
#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    async fn prompt(&self, cancel: &CancellationToken) -> Result<Password, OathError>;
}

/// Any `Fn(CancellationToken) -> impl Future<Output = Result<Password, OathError>>`
/// is a prompt, so plain async closures can be passed.
#[async_trait]
impl<F, Fut> PasswordPrompt for F
where
    F: Fn(CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Password, OathError>> + Send + 'static,
{
    async fn prompt(&self, cancel: &CancellationToken) -> Result<Password, OathError> {
        (self)(cancel.clone()).await
    }
}

/// Prompt that always answers with a fixed password
#[derive(Debug, Clone)]
pub struct StaticPassword(Password);

impl StaticPassword {
    pub fn new(password: Password) -> Self {
        Self(password)
    }

    /// Answers with the empty string, which disables prompting
    pub fn empty() -> Self {
        Self(Password::empty())
    }
}

#[async_trait]
impl PasswordPrompt for StaticPassword {
    async fn prompt(&self, _cancel: &CancellationToken) -> Result<Password, OathError> {
        Ok(self.0.clone())
    }
}
