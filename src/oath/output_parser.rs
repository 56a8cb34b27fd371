//! Parser for ykman OATH output
//!
//! Extracts a TOTP code or the account list from ykman stdout.

use crate::error::OathError;
use crate::types::OathCode;
use regex::Regex;
use std::sync::LazyLock;

/// Trailing run of 6 or more digits, e.g. "GitHub:alice  123456"
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{6,}$").expect("Failed to compile code pattern"));

/// Parser for `ykman oath accounts` stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputParser;

impl OutputParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract the code from `code --single` output
    ///
    /// ykman may print diagnostics before the code, so only the digits
    /// anchored at the end of the trimmed output count.
    pub fn parse_code(&self, output: &str) -> Result<OathCode, OathError> {
        CODE_PATTERN
            .find(output.trim())
            .map(|m| OathCode::new(m.as_str().to_string()))
            .ok_or(OathError::CodeParseFailed)
    }

    /// Split `list` output into trimmed, non-empty lines
    pub fn parse_lines(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}
