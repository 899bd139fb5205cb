//! Identifier cleaning and validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::RelayError;
use crate::observability::DiagnosticLogger;

/// Number of digits in a SteamID64.
pub const STEAM_ID_LENGTH: usize = 17;

/// A digits-only identifier of exactly [`STEAM_ID_LENGTH`] digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedIdentifier(String);

impl CleanedIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CleanedIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an identifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub cleaned: String,
    pub cleaned_length: usize,
    pub original_length: usize,
}

impl From<ValidationFailure> for RelayError {
    fn from(failure: ValidationFailure) -> Self {
        RelayError::Validation {
            cleaned: failure.cleaned,
            cleaned_length: failure.cleaned_length,
        }
    }
}

#[derive(Serialize)]
struct ValidationRecord<'a> {
    original_input: &'a str,
    original_length: usize,
    cleaned_input: &'a str,
    cleaned_length: usize,
    is_valid: bool,
}

/// Anything outside the Unicode decimal digits (`Nd`).
static NON_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D").expect("non-digit pattern is valid"));

/// Drop every character that is not a decimal digit.
///
/// Classification is Unicode-aware: full-width and other script digits
/// (`７`, `١`) are kept as they are, and multi-byte characters are never split.
pub fn clean(raw: &str) -> String {
    NON_DIGIT_RE.replace_all(raw, "").into_owned()
}

/// Validates raw identifiers and records every verdict.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierValidator<'a> {
    logger: &'a DiagnosticLogger,
}

impl<'a> IdentifierValidator<'a> {
    pub fn new(logger: &'a DiagnosticLogger) -> Self {
        Self { logger }
    }

    /// Clean `raw` and accept it iff exactly 17 digits remain.
    ///
    /// Lengths count characters. The diagnostic event is written before
    /// the verdict is returned, whatever the outcome.
    pub fn validate(&self, raw: &str) -> Result<CleanedIdentifier, ValidationFailure> {
        let cleaned = clean(raw);
        let original_length = raw.chars().count();
        let cleaned_length = cleaned.chars().count();
        let is_valid = cleaned_length == STEAM_ID_LENGTH;

        self.logger.log_data(
            "SteamID validation",
            &ValidationRecord {
                original_input: raw,
                original_length,
                cleaned_input: &cleaned,
                cleaned_length,
                is_valid,
            },
        );

        if is_valid {
            Ok(CleanedIdentifier(cleaned))
        } else {
            Err(ValidationFailure {
                cleaned,
                cleaned_length,
                original_length,
            })
        }
    }
}
