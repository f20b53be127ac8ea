//! Identifier validation and extraction from free text.
//!
//! Identifiers are INN (taxpayer number, 10 digits for legal entities, 12
//! for individuals) and OGRN/OGRNIP (registration number, 13 and 15 digits).
//! Validation never fails with an error: invalid input is a [`Validation`]
//! value carrying a [`Rejection`] and a user-facing message.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of a well-formed identifier, derived from its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    LegalInn,
    IndividualInn,
    LegalOgrn,
    IndividualOgrn,
}

impl IdKind {
    /// Kind for a digit string of `len` characters.
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            10 => Some(Self::LegalInn),
            12 => Some(Self::IndividualInn),
            13 => Some(Self::LegalOgrn),
            15 => Some(Self::IndividualOgrn),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LegalInn => "legal entity tax id",
            Self::IndividualInn => "individual tax id",
            Self::LegalOgrn => "legal entity registration number",
            Self::IndividualOgrn => "individual registration number",
        }
    }

    pub fn is_inn(&self) -> bool {
        matches!(self, Self::LegalInn | Self::IndividualInn)
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an identifier was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    NonDigit,
    Length,
    Checksum,
}

impl Rejection {
    /// Heading used when grouping rejected identifiers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NonDigit => "non-digit",
            Self::Length => "wrong length",
            Self::Checksum => "checksum mismatch",
        }
    }
}

/// How thoroughly identifiers are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Digits and length only.
    #[default]
    Format,
    /// Format plus INN check digits.
    Checksum,
}

/// Outcome of validating one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub kind: Option<IdKind>,
    pub rejection: Option<Rejection>,
    /// Kind label when valid, reason otherwise.
    pub message: String,
}

impl Validation {
    fn accepted(kind: IdKind) -> Self {
        Self {
            valid: true,
            kind: Some(kind),
            rejection: None,
            message: kind.label().to_string(),
        }
    }

    fn rejected(rejection: Rejection, kind: Option<IdKind>, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            kind,
            rejection: Some(rejection),
            message: message.into(),
        }
    }
}

/// Check characters and length; 10/12/13/15 digits are accepted.
pub fn validate_company_id(value: &str) -> Validation {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Validation::rejected(
            Rejection::NonDigit,
            None,
            "must contain only digits (non-digit characters found)",
        );
    }
    match IdKind::from_len(value.len()) {
        Some(kind) => Validation::accepted(kind),
        None => Validation::rejected(
            Rejection::Length,
            None,
            format!(
                "wrong length {}: accepted lengths are 10 or 12 (tax id), \
                 13 or 15 (registration number)",
                value.len()
            ),
        ),
    }
}

const LEGAL_WEIGHTS: [u32; 9] = [2, 4, 10, 3, 5, 9, 4, 6, 8];
const INDIVIDUAL_WEIGHTS_11: [u32; 10] = [7, 2, 4, 10, 3, 5, 9, 4, 6, 8];
const INDIVIDUAL_WEIGHTS_12: [u32; 11] = [3, 7, 2, 4, 10, 3, 5, 9, 4, 6, 8];

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    (sum % 11) % 10
}

/// Format check plus INN check digits. Registration numbers are checked
/// for format only.
pub fn validate_inn_checksum(value: &str) -> Validation {
    let validation = validate_company_id(value);
    let Some(kind) = validation.kind.filter(|k| validation.valid && k.is_inn()) else {
        return validation;
    };

    let digits: Vec<u32> = value.trim().bytes().map(|b| u32::from(b - b'0')).collect();
    let mismatch = match kind {
        IdKind::LegalInn => {
            (check_digit(&digits[..9], &LEGAL_WEIGHTS) != digits[9]).then_some("10th digit")
        }
        _ => {
            if check_digit(&digits[..10], &INDIVIDUAL_WEIGHTS_11) != digits[10] {
                Some("11th digit")
            } else if check_digit(&digits[..11], &INDIVIDUAL_WEIGHTS_12) != digits[11] {
                Some("12th digit")
            } else {
                None
            }
        }
    };
    match mismatch {
        Some(position) => Validation::rejected(
            Rejection::Checksum,
            Some(kind),
            format!("checksum mismatch ({}, {position})", kind.label()),
        ),
        None => validation,
    }
}

/// Validate with the given strictness.
pub fn validate(value: &str, strictness: Strictness) -> Validation {
    match strictness {
        Strictness::Format => validate_company_id(value),
        Strictness::Checksum => validate_inn_checksum(value),
    }
}

/// Options for [`extract_all`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Also pick 13/15-digit registration numbers out of text.
    pub include_registration_numbers: bool,
    /// Upper bound on returned candidates.
    pub max_items: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_registration_numbers: true,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// Default cap on identifiers taken from one message.
pub const DEFAULT_MAX_ITEMS: usize = 50;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s,;]+").expect("valid regex"));

/// Pull identifier candidates out of free text.
///
/// Maximal runs of ASCII digits with an accepted length are taken first, so
/// a 10-digit number is never cut out of a longer run. If there are none,
/// the text is split on whitespace, commas and semicolons and every token is
/// returned, valid or not, so the caller can report the bad ones. Results
/// are deduplicated in input order and truncated to `max_items`.
pub fn extract_all(text: &str, options: &ExtractOptions) -> Vec<String> {
    let accepted = |len: usize| match len {
        10 | 12 => true,
        13 | 15 => options.include_registration_numbers,
        _ => false,
    };
    let mut candidates: Vec<&str> = DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|run| accepted(run.len()))
        .collect();
    if candidates.is_empty() {
        candidates = SEPARATORS
            .split(text.trim())
            .filter(|token| !token.is_empty())
            .collect();
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(*c))
        .take(options.max_items)
        .map(str::to_string)
        .collect()
}
