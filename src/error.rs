//! Error types for the ykoath library
//!
//! `OathError` is the taxonomy every ykman invocation is mapped onto: exactly
//! one variant per failed call. The crate-level [`Error`] wraps it together
//! with configuration and I/O failures.

use std::fmt;
use thiserror::Error;

/// Main error type for the ykoath crate
#[derive(Error, Debug)]
pub enum Error {
    /// Errors reported by the OATH application or the ykman tool
    #[error("OATH error: {0}")]
    Oath(#[from] OathError),

    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Classified failure of a single OATH operation
#[derive(Error, Debug)]
pub enum OathError {
    /// ykman executable could not be located
    #[error("ykman command not found")]
    CommandNotFound,

    /// ykman was terminated by SIGINT/SIGTERM, cancelled or timed out
    #[error("ykman command interrupted")]
    CommandInterrupted,

    /// YubiKey is not connected to the host
    #[error("yubikey device not found")]
    DeviceNotFound,

    /// YubiKey was physically removed during the operation
    #[error("yubikey device removed")]
    DeviceRemoved,

    /// YubiKey was not touched within ykman's timeout
    #[error("yubikey device timeout")]
    DeviceTimeout,

    /// OATH application is password protected and no password was given
    #[error("oath application is password protected")]
    PasswordRequired,

    /// Supplied password was rejected by the OATH application
    #[error("oath application password is incorrect")]
    PasswordIncorrect,

    /// No account matched the requested name
    #[error("oath account not found")]
    AccountNotFound,

    /// ykman output did not end with a valid code
    #[error("oath account code could not be parsed")]
    CodeParseFailed,

    /// The other credential mode is already set on the session
    #[error("cannot configure credentials: {configured} already set")]
    PasswordAlreadyConfigured { configured: CredentialKind },

    /// No password has unlocked the OATH application in this session yet
    #[error("password not resolved")]
    NoPasswordResolved,

    /// A literal password was passed to a prompt-driven call
    #[error("password string not allowed when using prompt")]
    PasswordPromptConflict,

    /// Device serial is neither empty nor at least 8 digits
    #[error("invalid device serial: {serial:?}")]
    InvalidDeviceSerial { serial: String },

    /// Failure raised by a password prompt implementation
    #[error("password prompt failed: {0}")]
    PromptFailed(#[source] anyhow::Error),

    /// Caller cancelled the operation outside of a running ykman process
    #[error("operation cancelled")]
    Cancelled,

    /// Any other ykman failure, kept for diagnostics
    #[error("ykman failed: {0}")]
    Unclassified(#[source] CommandFailure),
}

/// Which credential source an [`crate::oath::AccountSession`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Password,
    Prompt,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Password => f.write_str("password"),
            CredentialKind::Prompt => f.write_str("password prompt"),
        }
    }
}

/// Underlying ykman failure that matched none of the known messages
#[derive(Error, Debug)]
pub enum CommandFailure {
    #[error("exited with status {code}: {stderr}")]
    Exit { code: i32, stderr: String },

    #[error("terminated by signal {signal}: {stderr}")]
    Signal { signal: i32, stderr: String },

    #[error("failed to run ykman: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
