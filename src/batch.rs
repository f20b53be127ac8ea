//! Checking every identifier found in one message.

use tracing::debug;

use crate::lookup::LookupClient;
use crate::types::Record;
use crate::validate::{self, ExtractOptions, Rejection, Strictness};

/// How a batch extracts and validates identifiers.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub strictness: Strictness,
    pub extract: ExtractOptions,
}

/// Result for one identifier, in input order.
#[derive(Debug, Clone)]
pub enum Outcome {
    Found {
        identifier: String,
        /// Kind label of the identifier ("legal entity tax id", ...).
        label: String,
        record: Record,
    },
    NotFound {
        identifier: String,
    },
    Invalid {
        identifier: String,
        rejection: Rejection,
        message: String,
    },
}

impl Outcome {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Found { identifier, .. }
            | Self::NotFound { identifier }
            | Self::Invalid { identifier, .. } => identifier,
        }
    }
}

/// Per-identifier outcomes and totals of one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
    pub found: usize,
    pub not_found: usize,
    pub invalid: Vec<(String, Rejection)>,
}

impl BatchReport {
    /// `Result: found F, not found N.` followed by one line per rejection
    /// kind that occurred.
    pub fn totals_line(&self) -> String {
        let mut text = format!(
            "Result: found {}, not found {}.",
            self.found, self.not_found
        );
        for rejection in [Rejection::NonDigit, Rejection::Length, Rejection::Checksum] {
            let identifiers: Vec<&str> = self
                .invalid
                .iter()
                .filter(|(_, r)| *r == rejection)
                .map(|(id, _)| id.as_str())
                .collect();
            if !identifiers.is_empty() {
                text.push_str(&format!("\n{}: {}", rejection.label(), identifiers.join(", ")));
            }
        }
        text
    }

    /// First found record in input order.
    pub fn first_found(&self) -> Option<(&str, &Record)> {
        self.outcomes.iter().find_map(|outcome| match outcome {
            Outcome::Found {
                identifier, record, ..
            } => Some((identifier.as_str(), record)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Extract identifiers from `text`, validate them and look up the valid
/// ones one after another.
pub async fn check_identifiers(
    client: &LookupClient,
    text: &str,
    options: &BatchOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    for identifier in validate::extract_all(text, &options.extract) {
        let validation = validate::validate(&identifier, options.strictness);
        let outcome = match validation.rejection {
            Some(rejection) => {
                report.invalid.push((identifier.clone(), rejection));
                Outcome::Invalid {
                    identifier,
                    rejection,
                    message: validation.message,
                }
            }
            None => match client.fetch_company(&identifier).await {
                Some(record) => {
                    report.found += 1;
                    Outcome::Found {
                        identifier,
                        label: validation.message,
                        record,
                    }
                }
                None => {
                    report.not_found += 1;
                    Outcome::NotFound { identifier }
                }
            },
        };
        report.outcomes.push(outcome);
    }
    debug!(
        found = report.found,
        not_found = report.not_found,
        invalid = report.invalid.len(),
        "batch checked"
    );
    report
}
