//! Configuration module
//!
//! Handles the ykman location, default device and invocation timeout,
//! loaded from TOML files.

use crate::error::ConfigError;
use crate::types::DeviceSerial;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod toml_config;

/// Default ykman executable, resolved through `$PATH`
pub const DEFAULT_YKMAN_PATH: &str = "ykman";

/// ykoath configuration structure
///
/// Contains no secrets; OATH passwords are supplied at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OathConfig {
    /// ykman executable name or path
    pub ykman_path: PathBuf,

    /// Serial of the YubiKey to use when several are attached
    pub device: Option<String>,

    /// Upper bound for a single ykman invocation in seconds
    pub timeout_secs: Option<u64>,
}

impl OathConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ykman_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "ykman_path cannot be empty".to_string(),
            });
        }

        if let Some(device) = &self.device {
            DeviceSerial::parse(device).map_err(|e| ConfigError::ValidationError {
                message: e.to_string(),
            })?;
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "timeout_secs cannot be zero".to_string(),
            });
        }

        Ok(())
    }

    /// Configured device serial, or "any device" when unset
    pub fn device_serial(&self) -> Result<DeviceSerial, ConfigError> {
        match &self.device {
            Some(device) => DeviceSerial::parse(device).map_err(|e| ConfigError::ValidationError {
                message: e.to_string(),
            }),
            None => Ok(DeviceSerial::any()),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for OathConfig {
    fn default() -> Self {
        Self {
            ykman_path: PathBuf::from(DEFAULT_YKMAN_PATH),
            device: None,
            timeout_secs: None,
        }
    }
}
