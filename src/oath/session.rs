//! Stateful access to one YubiKey's OATH accounts
//!
//! A session binds a device serial and a credential source, and remembers
//! the password that unlocked the OATH application so later operations do
//! not prompt again.

use crate::config::OathConfig;
use crate::error::{ConfigError, CredentialKind, OathError};
use crate::oath::prompt::{PasswordPrompt, StaticPassword};
use crate::oath::retry::AuthState;
use crate::oath::OathClient;
use crate::types::{DeviceSerial, OathCode, Password};
use crate::ykman::{CommandRunner, Request, YkmanRunner};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How the session obtains a password when ykman asks for one
enum CredentialSource {
    /// Answer with the empty password, i.e. never unlock
    Unset,
    Literal(Password),
    Prompt(Arc<dyn PasswordPrompt>),
}

impl CredentialSource {
    fn as_prompt(&self) -> Arc<dyn PasswordPrompt> {
        match self {
            CredentialSource::Unset => Arc::new(StaticPassword::empty()),
            CredentialSource::Literal(password) => Arc::new(StaticPassword::new(password.clone())),
            CredentialSource::Prompt(prompt) => Arc::clone(prompt),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Unset => f.write_str("Unset"),
            CredentialSource::Literal(_) => f.write_str("Literal(<redacted>)"),
            CredentialSource::Prompt(_) => f.write_str("Prompt(..)"),
        }
    }
}

/// OATH accounts of one YubiKey
///
/// Operations take `&mut self`: a session caches the resolved password and
/// must not be shared between concurrent operations.
pub struct AccountSession<R = YkmanRunner> {
    client: OathClient<R>,
    serial: DeviceSerial,
    credentials: CredentialSource,
    auth: AuthState,
    cancel: CancellationToken,
}

impl<R> fmt::Debug for AccountSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSession")
            .field("serial", &self.serial)
            .field("credentials", &self.credentials)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl AccountSession<YkmanRunner> {
    /// Session on the configured device, running ykman as configured
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configured device serial
    /// is invalid.
    pub fn from_config(config: &OathConfig) -> Result<Self, ConfigError> {
        let serial = config.device_serial()?;
        Ok(Self::with_serial(OathClient::from_config(config), serial))
    }
}

impl<R: CommandRunner> AccountSession<R> {
    /// Create a session for the device with the given serial
    ///
    /// # Errors
    ///
    /// Returns `OathError::InvalidDeviceSerial` unless `serial` is empty
    /// (any device) or at least 8 digits.
    pub fn new(client: OathClient<R>, serial: &str) -> Result<Self, OathError> {
        let serial = DeviceSerial::parse(serial)?;
        Ok(Self::with_serial(client, serial))
    }

    fn with_serial(client: OathClient<R>, serial: DeviceSerial) -> Self {
        Self {
            client,
            serial,
            credentials: CredentialSource::Unset,
            auth: AuthState::Unauthenticated,
            cancel: CancellationToken::new(),
        }
    }

    /// Bound every operation of this session by `cancel`
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Currently configured device serial
    pub fn serial(&self) -> &DeviceSerial {
        &self.serial
    }

    pub fn auth_state(&self) -> &AuthState {
        &self.auth
    }

    /// Configure the OATH application password directly
    ///
    /// Mutually exclusive with [`set_password_prompt`](Self::set_password_prompt).
    /// The empty password clears a previously set one.
    pub fn set_password(&mut self, password: Password) -> Result<(), OathError> {
        if let CredentialSource::Prompt(_) = self.credentials {
            return Err(OathError::PasswordAlreadyConfigured {
                configured: CredentialKind::Prompt,
            });
        }
        self.credentials = if password.is_empty() {
            CredentialSource::Unset
        } else {
            CredentialSource::Literal(password)
        };
        Ok(())
    }

    /// Configure a prompt consulted if/when the OATH application password is
    /// required
    ///
    /// Mutually exclusive with [`set_password`](Self::set_password).
    pub fn set_password_prompt<P>(&mut self, prompt: P) -> Result<(), OathError>
    where
        P: PasswordPrompt + 'static,
    {
        if let CredentialSource::Literal(_) = self.credentials {
            return Err(OathError::PasswordAlreadyConfigured {
                configured: CredentialKind::Password,
            });
        }
        self.credentials = CredentialSource::Prompt(Arc::new(prompt));
        Ok(())
    }

    /// Password that unlocked the OATH application in this session
    pub fn get_password(&self) -> Result<Password, OathError> {
        self.auth.password().cloned().ok_or(OathError::NoPasswordResolved)
    }

    /// Whether the device answers at all
    pub async fn is_available(&self) -> bool {
        let request = Request::info(self.serial.clone());
        self.client
            .engine()
            .invoker()
            .execute(&request, &self.cancel)
            .await
            .is_ok()
    }

    /// Whether the OATH application requires a password
    pub async fn is_password_protected(&self) -> bool {
        let request = Request::list(self.serial.clone());
        matches!(
            self.client
                .engine()
                .invoker()
                .execute(&request, &self.cancel)
                .await,
            Err(OathError::PasswordRequired)
        )
    }

    /// Accounts configured in the OATH application
    pub async fn list(&mut self) -> Result<Vec<String>, OathError> {
        let output = self.execute(Request::list(self.serial.clone())).await?;
        Ok(self.client.parser().parse_lines(&output))
    }

    /// Whether `account` is configured (exact name match)
    pub async fn has_account(&mut self, account: &str) -> Result<bool, OathError> {
        let accounts = self.list().await?;
        Ok(accounts.iter().any(|a| a == account))
    }

    /// TOTP code for `account` (such as `"<issuer>:<name>"`)
    pub async fn code(&mut self, account: &str) -> Result<OathCode, OathError> {
        let output = self
            .execute(Request::code(self.serial.clone(), account))
            .await?;
        self.client.parser().parse_code(&output)
    }

    async fn execute(&mut self, request: Request) -> Result<String, OathError> {
        if let AuthState::Authenticated(password) = &self.auth {
            let request = request.with_password(Some(password.clone()));
            return self
                .client
                .engine()
                .invoker()
                .execute(&request, &self.cancel)
                .await;
        }

        let prompt = self.credentials.as_prompt();
        let (output, state) = self
            .client
            .engine()
            .run(request, prompt.as_ref(), &self.cancel)
            .await?;

        if let AuthState::Authenticated(_) = state {
            tracing::debug!("Caching resolved OATH password for device {:?}", self.serial.as_str());
            self.auth = state;
        }

        Ok(output)
    }
}
