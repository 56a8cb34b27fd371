//! ykman argument construction
//!
//! Turns a [`Request`] into the exact argument vector passed to ykman:
//! `[--device <serial>] oath accounts <action> [args...] [--password <password>]`

use crate::types::{DeviceSerial, Password};

/// Namespace selecting ykman's OATH accounts commands
pub const OATH_NAMESPACE: [&str; 2] = ["oath", "accounts"];

/// Placeholder shown instead of the password in logged command lines
pub const REDACTED: &str = "<redacted>";

/// Which part of ykman a request addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `ykman oath accounts ...`
    OathAccounts,
    /// Top-level commands such as `ykman info`
    Device,
}

/// One ykman invocation
#[derive(Debug, Clone)]
pub struct Request {
    pub device: DeviceSerial,
    pub password: Option<Password>,
    pub scope: Scope,
    pub action: String,
    pub action_args: Vec<String>,
}

impl Request {
    pub fn new(device: DeviceSerial, action: impl Into<String>) -> Self {
        Self {
            device,
            password: None,
            scope: Scope::OathAccounts,
            action: action.into(),
            action_args: Vec::new(),
        }
    }

    /// `oath accounts list`
    pub fn list(device: DeviceSerial) -> Self {
        Self::new(device, "list")
    }

    /// `oath accounts code --single <account>`
    pub fn code(device: DeviceSerial, account: &str) -> Self {
        Self::new(device, "code").with_args(["--single", account])
    }

    /// `info`, outside of the OATH namespace
    pub fn info(device: DeviceSerial) -> Self {
        Self {
            scope: Scope::Device,
            ..Self::new(device, "info")
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_password(mut self, password: Option<Password>) -> Self {
        self.password = password;
        self
    }

    /// Whether a non-empty password accompanies this request
    pub fn has_password(&self) -> bool {
        self.password.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Build the ykman argument vector for a request
pub fn build_args(request: &Request) -> Vec<String> {
    assemble(request, |password| password.expose().to_string())
}

/// Same as [`build_args`] with the password replaced by [`REDACTED`]
pub fn redacted_args(request: &Request) -> Vec<String> {
    assemble(request, |_| REDACTED.to_string())
}

fn assemble(request: &Request, render_password: impl Fn(&Password) -> String) -> Vec<String> {
    let mut args = Vec::with_capacity(request.action_args.len() + 7);

    if !request.device.is_empty() {
        args.push("--device".to_string());
        args.push(request.device.as_str().to_string());
    }

    if request.scope == Scope::OathAccounts {
        args.extend(OATH_NAMESPACE.iter().map(|s| s.to_string()));
    }

    args.push(request.action.clone());
    args.extend(request.action_args.iter().cloned());

    if let Some(password) = request.password.as_ref().filter(|p| !p.is_empty()) {
        args.push("--password".to_string());
        args.push(render_password(password));
    }

    args
}
