//! TOML configuration file I/O
//!
//! Loads and saves `OathConfig` to/from TOML files in the user's
//! configuration directory.

use crate::config::OathConfig;
use crate::error::{ConfigError, Error};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns `$YKOATH_CONFIG_DIR` if set, otherwise `~/.config/ykoath`.
pub fn get_config_dir() -> Result<PathBuf, Error> {
    if let Ok(config_dir) = std::env::var("YKOATH_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        Error::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("ykoath"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, Error> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load configuration from the default TOML file
///
/// A missing default file is not an error: defaults are used instead.
pub fn load_config() -> Result<OathConfig, Error> {
    let config_path = get_config_path()?;
    if !config_path.exists() {
        debug!(
            "No configuration at {}, using defaults",
            config_path.display()
        );
        return Ok(OathConfig::default());
    }
    load_config_from_path(&config_path)
}

/// Load configuration from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<OathConfig, Error> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => Error::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: OathConfig = toml::from_str(&contents)?;
    config.validate()?;

    debug!(
        "Loaded configuration from {}: ykman_path={}, device={:?}, timeout_secs={:?}",
        path.as_ref().display(),
        config.ykman_path.display(),
        config.device,
        config.timeout_secs
    );

    Ok(config)
}

/// Save configuration to a specific TOML file, creating parent directories
pub fn save_config_to_path<P: AsRef<Path>>(config: &OathConfig, path: P) -> Result<(), Error> {
    config.validate()?;
    let contents = toml::to_string_pretty(config)?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    std::fs::write(&path, contents).map_err(|e| {
        Error::Config(ConfigError::IoError {
            message: format!("Failed to write config file: {}", e),
        })
    })?;

    Ok(())
}
