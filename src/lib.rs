//! Core library for ykoath
//!
//! Typed access to the OATH/TOTP application of a YubiKey through the
//! `ykman` command-line tool: argument construction, classification of
//! ykman's stderr into [`error::OathError`], output parsing and the
//! prompt-and-retry password protocol.

pub mod error;
pub mod types;

pub mod config;
pub mod oath;
pub mod ykman;

pub use error::{Error, OathError, Result};
pub use oath::{AccountSession, OathClient, Options, PasswordPrompt};
pub use types::{DeviceSerial, OathCode, Password};

/// Initialize logging infrastructure
///
/// Logs to the systemd journal when running under systemd, otherwise to
/// stderr with pretty formatting. The level comes from `RUST_LOG` and
/// defaults to `info`. Fails if a global subscriber is already installed.
pub fn init_logging() -> std::result::Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(filter)
                .try_init()?;
            return Ok(());
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;

    Ok(())
}
