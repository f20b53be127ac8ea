//! Organisation status labels and reason-code descriptions.
//!
//! Reason codes come from the public `party-state.csv` reference table
//! (columns `type,code,status,description`). The table is optional: when it
//! is missing every status renders without a reason.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::Value;
use tracing::{debug, warn};

use super::value::{PLACEHOLDER, escape_html, scalar_text};
use crate::{KontragentError, Result};

/// Environment variable overriding the reference table location.
pub const PARTY_STATE_CSV_ENV: &str = "KONTRAGENT_PARTY_STATE_CSV";

/// Table location used when the environment variable is not set.
pub const DEFAULT_PARTY_STATE_CSV: &str = "data/party-state.csv";

/// Presentation label for a registry status code, if it is a known one.
pub fn status_label(status: &str) -> Option<&'static str> {
    Some(match status {
        "ACTIVE" => "✅ active",
        "LIQUIDATING" => "⚠️ liquidating",
        "LIQUIDATED" => "❌ liquidated",
        "BANKRUPT" => "❌ bankrupt",
        "REORGANIZING" => "⚠️ reorganizing",
        _ => return None,
    })
}

/// `(entity type, reason code, status)` → description.
///
/// An empty status in the key is the per-code fallback used when no row
/// matches the exact status.
#[derive(Debug, Clone, Default)]
pub struct PartyStateTable {
    entries: HashMap<(String, String, String), String>,
}

impl PartyStateTable {
    /// Parse CSV text with a `type,code,status,description` header.
    ///
    /// Column order is taken from the header. Rows missing a type, code or
    /// description are skipped.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| KontragentError::Configuration("party state table is empty".into()))?;
        let header: Vec<String> = split_csv_line(header.trim_start_matches('\u{feff}'))
            .into_iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        let column = |name: &str| {
            header.iter().position(|h| h == name).ok_or_else(|| {
                KontragentError::Configuration(format!("party state table lacks `{name}` column"))
            })
        };
        let (kind_col, code_col, status_col, desc_col) = (
            column("type")?,
            column("code")?,
            column("status")?,
            column("description")?,
        );

        let mut entries = HashMap::new();
        for line in lines {
            let row = split_csv_line(line);
            let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or_default();
            let kind = cell(kind_col).to_ascii_uppercase();
            let code = cell(code_col).to_string();
            let status = cell(status_col).to_ascii_uppercase();
            let description = cell(desc_col).to_string();
            if kind.is_empty() || code.is_empty() || description.is_empty() {
                continue;
            }
            entries
                .entry((kind.clone(), code.clone(), String::new()))
                .or_insert_with(|| description.clone());
            entries.insert((kind, code, status), description);
        }
        Ok(Self { entries })
    }

    /// Read and parse a table file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            KontragentError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_csv_str(&text)
    }

    /// Load a table, degrading to an empty one when the file is absent or bad.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "party state table not found");
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "party state table ignored");
            Self::default()
        })
    }

    /// Process-wide table, loaded on first use.
    pub fn global() -> &'static PartyStateTable {
        static TABLE: OnceLock<PartyStateTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let path = std::env::var_os(PARTY_STATE_CSV_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PARTY_STATE_CSV));
            Self::load_or_empty(path)
        })
    }

    /// Description of `code`, preferring the row for `status`.
    pub fn describe(&self, kind: &str, code: &str, status: &str) -> Option<&str> {
        let exact = (kind.to_string(), code.to_string(), status.to_string());
        self.entries
            .get(&exact)
            .or_else(|| {
                self.entries
                    .get(&(kind.to_string(), code.to_string(), String::new()))
            })
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Status label of a `state` object, with the reason description if known.
///
/// Unknown statuses are shown verbatim; a missing or empty state is the
/// placeholder. Output is HTML-escaped.
pub fn format_company_state(
    state: Option<&Value>,
    entity_type: Option<&str>,
    table: &PartyStateTable,
) -> String {
    let Some(state) = state.filter(|s| s.as_object().is_some_and(|m| !m.is_empty())) else {
        return PLACEHOLDER.to_string();
    };

    let status = scalar_text(state.get("status"))
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_default();
    let base = match status_label(&status) {
        Some(label) => label.to_string(),
        None if status.is_empty() => PLACEHOLDER.to_string(),
        None => escape_html(&status),
    };

    let Some(code) = scalar_text(state.get("code")) else {
        return base;
    };
    let kind = if entity_type == Some("INDIVIDUAL") {
        "INDIVIDUAL"
    } else {
        "LEGAL"
    };
    match table.describe(kind, &code, &status) {
        Some(description) => format!(
            "{base} (code {}: {})",
            escape_html(&code),
            escape_html(description)
        ),
        None => base,
    }
}

/// Split one CSV record: commas separate, double quotes group, `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => cells.push(std::mem::take(&mut cell)),
            (c, _) => cell.push(c),
        }
    }
    cells.push(cell);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CSV: &str = "\
type,code,status,description
LEGAL,101,LIQUIDATING,\"Находится в стадии ликвидации\"
LEGAL,101,,Общее описание кода 101
INDIVIDUAL,101,LIQUIDATED,\"Отсутствует в связи со смертью\"
LEGAL,102,,\"Описание, с запятой и \"\"кавычками\"\"\"
LEGAL,,ACTIVE,no code
";

    fn table() -> PartyStateTable {
        PartyStateTable::from_csv_str(CSV).unwrap()
    }

    #[test]
    fn parses_rows_and_skips_incomplete() {
        let t = table();
        assert_eq!(
            t.describe("LEGAL", "102", ""),
            Some("Описание, с запятой и \"кавычками\"")
        );
        assert_eq!(t.describe("LEGAL", "", "ACTIVE"), None);
    }

    #[test]
    fn exact_status_wins_over_fallback() {
        let t = table();
        assert_eq!(
            t.describe("LEGAL", "101", "LIQUIDATING"),
            Some("Находится в стадии ликвидации")
        );
        assert_eq!(
            t.describe("LEGAL", "101", "ACTIVE"),
            Some("Общее описание кода 101")
        );
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = PartyStateTable::from_csv_str("type,code,description\n").unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn placeholder_without_state() {
        let t = table();
        assert_eq!(format_company_state(None, Some("LEGAL"), &t), PLACEHOLDER);
        assert_eq!(format_company_state(Some(&json!({})), None, &t), PLACEHOLDER);
    }

    #[test]
    fn base_label_without_code() {
        let state = json!({"status": "ACTIVE"});
        assert_eq!(format_company_state(Some(&state), Some("LEGAL"), &table()), "✅ active");
    }

    #[test]
    fn reason_from_table() {
        let state = json!({"status": "LIQUIDATING", "code": "101"});
        let text = format_company_state(Some(&state), Some("LEGAL"), &table());
        assert_eq!(text, "⚠️ liquidating (code 101: Находится в стадии ликвидации)");
    }

    #[test]
    fn individual_rows_for_individuals() {
        let state = json!({"status": "LIQUIDATED", "code": 101});
        let text = format_company_state(Some(&state), Some("INDIVIDUAL"), &table());
        assert!(text.starts_with("❌ liquidated"));
        assert!(text.contains("Отсутствует в связи со смертью"));
    }

    #[test]
    fn unknown_code_keeps_base_label() {
        let state = json!({"status": "ACTIVE", "code": "999999"});
        assert_eq!(format_company_state(Some(&state), None, &table()), "✅ active");
    }

    #[test]
    fn unknown_status_is_verbatim() {
        let state = json!({"status": "suspended<x>"});
        assert_eq!(
            format_company_state(Some(&state), None, &PartyStateTable::default()),
            "SUSPENDED&lt;X&gt;"
        );
    }

    #[test]
    fn missing_file_gives_empty_table() {
        let t = PartyStateTable::load_or_empty("/nonexistent/party-state.csv");
        assert!(t.is_empty());
    }
}
