//! Type definitions and wrappers for secure data handling
//!
//! Passwords and generated codes are wrapped in `secrecy::Secret` so they
//! never show up in logs or debug output.

use crate::error::OathError;
use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use std::sync::LazyLock;

/// Serial is either empty (any device) or at least 8 digits
static DEVICE_SERIAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^$|^[0-9]{8,}$").expect("Failed to compile device serial pattern"));

/// Password for the YubiKey OATH application
#[derive(Clone, Debug)]
pub struct Password(Secret<String>);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Secret::new(password.into()))
    }

    /// The empty password, meaning "no password"
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Expose the password value (use with caution!)
    ///
    /// Only meant for handing the password to ykman.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

/// TOTP code generated by the YubiKey
///
/// Short-lived, but still treated as sensitive and never logged.
#[derive(Clone, Debug)]
pub struct OathCode(Secret<String>);

impl OathCode {
    pub(crate) fn new(code: String) -> Self {
        Self(Secret::new(code))
    }

    /// Expose the code value (use with caution!)
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Validated YubiKey device serial
///
/// An empty serial selects whichever single device is attached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceSerial(String);

impl DeviceSerial {
    /// Validate a serial string
    ///
    /// # Errors
    ///
    /// Returns `OathError::InvalidDeviceSerial` unless the serial is empty or
    /// consists of 8 or more ASCII digits.
    pub fn parse(serial: &str) -> Result<Self, OathError> {
        if !DEVICE_SERIAL_PATTERN.is_match(serial) {
            return Err(OathError::InvalidDeviceSerial {
                serial: serial.to_string(),
            });
        }
        Ok(Self(serial.to_string()))
    }

    /// Selector for "any attached device"
    pub fn any() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
