//! ykman failure classification
//!
//! ykman reports failures only as free-form text on stderr. The messages
//! below are matched verbatim (case-sensitive containment) and form the
//! compatibility contract with the ykman versions we support.

use crate::error::{CommandFailure, OathError};
use crate::ykman::runner::Termination;
use nix::sys::signal::Signal;
use std::io;

pub const MSG_CONNECT_FAILED: &str = "Failed connecting to the YubiKey";
pub const MSG_OPEN_DEVICE_FAILED: &str = "Failed to open device for communication";
pub const MSG_TRANSMIT_FAILED: &str = "Failed to transmit with protocol";
pub const MSG_TOUCH_TIMEOUT: &str = "Touch account timed out!";
pub const MSG_WRONG_PASSWORD: &str = "Authentication to the YubiKey failed. Wrong password?";
pub const MSG_NO_ACCOUNT: &str = "No matching account found.";

/// Outcome of one invocation as seen by the classifier
#[derive(Debug)]
pub enum Outcome {
    Success,
    /// ykman binary could not be located
    ToolNotFound,
    /// Process could not be started for another reason
    SpawnFailed(io::Error),
    Terminated(Termination),
}

impl From<io::Error> for Outcome {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            Outcome::ToolNotFound
        } else {
            Outcome::SpawnFailed(e)
        }
    }
}

impl From<Termination> for Outcome {
    fn from(termination: Termination) -> Self {
        if termination.success() {
            Outcome::Success
        } else {
            Outcome::Terminated(termination)
        }
    }
}

/// Map a finished invocation onto the error taxonomy
///
/// Returns `None` for a successful invocation. Checks run in a fixed order
/// and the first match wins; signal termination is detected before stderr is
/// looked at since stderr is usually empty then.
pub fn classify(outcome: Outcome, stderr: &str, password_supplied: bool) -> Option<OathError> {
    let termination = match outcome {
        Outcome::Success => return None,
        Outcome::ToolNotFound => return Some(OathError::CommandNotFound),
        Outcome::SpawnFailed(e) => return Some(OathError::Unclassified(CommandFailure::Spawn(e))),
        Outcome::Terminated(termination) => termination,
    };

    if is_interrupted(termination) {
        return Some(OathError::CommandInterrupted);
    }

    if stderr.contains(MSG_CONNECT_FAILED) || stderr.contains(MSG_OPEN_DEVICE_FAILED) {
        return Some(OathError::DeviceNotFound);
    }

    if stderr.contains(MSG_TRANSMIT_FAILED) {
        return Some(OathError::DeviceRemoved);
    }

    if stderr.contains(MSG_TOUCH_TIMEOUT) {
        return Some(OathError::DeviceTimeout);
    }

    if stderr.contains(MSG_WRONG_PASSWORD) {
        return Some(if password_supplied {
            OathError::PasswordIncorrect
        } else {
            OathError::PasswordRequired
        });
    }

    if stderr.contains(MSG_NO_ACCOUNT) {
        return Some(OathError::AccountNotFound);
    }

    let stderr = stderr.trim().to_string();
    let failure = match termination {
        Termination::Signaled(signal) => CommandFailure::Signal { signal, stderr },
        Termination::Exited(code) => CommandFailure::Exit { code, stderr },
        Termination::Cancelled | Termination::TimedOut => return Some(OathError::CommandInterrupted),
    };
    Some(OathError::Unclassified(failure))
}

/// Classify a runner error, i.e. ykman never ran
pub fn classify_spawn_error(error: io::Error) -> OathError {
    match Outcome::from(error) {
        Outcome::SpawnFailed(e) => OathError::Unclassified(CommandFailure::Spawn(e)),
        _ => OathError::CommandNotFound,
    }
}

fn is_interrupted(termination: Termination) -> bool {
    match termination {
        Termination::Cancelled | Termination::TimedOut => true,
        Termination::Signaled(signal) => matches!(
            Signal::try_from(signal),
            Ok(Signal::SIGINT) | Ok(Signal::SIGTERM)
        ),
        Termination::Exited(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exited(code: i32) -> Outcome {
        Outcome::Terminated(Termination::Exited(code))
    }

    #[test]
    fn test_success_is_not_an_error() {
        assert!(classify(Outcome::Success, MSG_WRONG_PASSWORD, false).is_none());
    }

    #[test]
    fn test_tool_not_found_ignores_stderr() {
        assert!(matches!(
            classify(Outcome::ToolNotFound, MSG_NO_ACCOUNT, true),
            Some(OathError::CommandNotFound)
        ));
    }

    #[test]
    fn test_interrupt_signals_win_over_stderr() {
        for signal in [Signal::SIGINT, Signal::SIGTERM] {
            let outcome = Outcome::Terminated(Termination::Signaled(signal as i32));
            assert!(matches!(
                classify(outcome, MSG_CONNECT_FAILED, false),
                Some(OathError::CommandInterrupted)
            ));
        }
    }

    #[test]
    fn test_other_signal_is_unclassified() {
        let outcome = Outcome::Terminated(Termination::Signaled(Signal::SIGKILL as i32));
        match classify(outcome, "", false) {
            Some(OathError::Unclassified(CommandFailure::Signal { signal, .. })) => {
                assert_eq!(signal, Signal::SIGKILL as i32)
            }
            other => panic!("Expected Unclassified signal failure, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_and_timeout_are_interrupted() {
        for termination in [Termination::Cancelled, Termination::TimedOut] {
            assert!(matches!(
                classify(Outcome::Terminated(termination), "", false),
                Some(OathError::CommandInterrupted)
            ));
        }
    }

    #[test]
    fn test_device_not_found_takes_priority_over_password() {
        let stderr = format!("{}\n{}", MSG_WRONG_PASSWORD, MSG_CONNECT_FAILED);
        assert!(matches!(
            classify(exited(1), &stderr, false),
            Some(OathError::DeviceNotFound)
        ));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        match classify(exited(2), "failed connecting to the yubikey", false) {
            Some(OathError::Unclassified(CommandFailure::Exit { code, stderr })) => {
                assert_eq!(code, 2);
                assert_eq!(stderr, "failed connecting to the yubikey");
            }
            other => panic!("Expected Unclassified exit failure, got {:?}", other),
        }
    }

    #[test]
    fn test_spawn_failure_is_unclassified() {
        let outcome = Outcome::SpawnFailed(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(
            classify(outcome, "", false),
            Some(OathError::Unclassified(CommandFailure::Spawn(_)))
        ));
    }

    #[test]
    fn test_outcome_conversions() {
        assert!(matches!(
            Outcome::from(io::Error::from(io::ErrorKind::NotFound)),
            Outcome::ToolNotFound
        ));
        assert!(matches!(
            Outcome::from(io::Error::from(io::ErrorKind::PermissionDenied)),
            Outcome::SpawnFailed(_)
        ));
        assert!(matches!(
            Outcome::from(Termination::Exited(0)),
            Outcome::Success
        ));
        assert!(matches!(
            Outcome::from(Termination::Exited(1)),
            Outcome::Terminated(Termination::Exited(1))
        ));
    }
}
