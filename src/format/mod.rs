//! HTML rendering of registry records for a chat transport.
//!
//! Records are untyped JSON and every field is optional, so each page is a
//! total function: any record (even `{}`) renders to non-empty text, with
//! [`value::PLACEHOLDER`] standing in for anything absent. Text taken from
//! the record is HTML-escaped once, markup added here is not.
//!
//! ```
//! use kontragent::format::render;
//! use kontragent::Page;
//!
//! let record = serde_json::json!({"data": {"inn": "7707083893"}});
//! assert!(render(&record, Page::Card).contains("7707083893"));
//! ```

mod card;
mod dump;
mod export;
mod sections;
pub mod state;
pub mod value;

pub use dump::{DEFAULT_MAX_LINES, render_fields};
pub use sections::format_branches_list;
pub use state::{PartyStateTable, format_company_state};
pub use value::{PLACEHOLDER, escape_html, format_date, format_money};

use serde_json::Value;

use crate::types::{Page, Record};

/// Page renderer bound to a reason-code table and a dump limit.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    states: &'a PartyStateTable,
    max_dump_lines: usize,
}

impl Default for Renderer<'static> {
    fn default() -> Self {
        Self::new(PartyStateTable::global())
    }
}

impl<'a> Renderer<'a> {
    pub fn new(states: &'a PartyStateTable) -> Self {
        Self {
            states,
            max_dump_lines: DEFAULT_MAX_LINES,
        }
    }

    /// Cap the number of lines on the raw page.
    pub fn max_dump_lines(mut self, lines: usize) -> Self {
        self.max_dump_lines = lines;
        self
    }

    /// Render one page of `record`.
    pub fn render(&self, record: &Record, page: Page) -> String {
        match page {
            Page::Card => card::render_card(record, self.states),
            Page::Details => card::render_details(record, self.states),
            Page::Contacts => sections::render_contacts(record),
            Page::Finance => sections::render_finance(record),
            Page::Founders => sections::render_founders(record),
            Page::Management => sections::render_management(record),
            Page::Taxes => sections::render_taxes(record),
            Page::Litigation => sections::render_litigation(record),
            Page::Documents => sections::render_documents(record),
            Page::Successor => sections::render_successor(record),
            Page::Export => export::render_requisites(record),
            Page::Crm => export::render_crm(record, self.states),
            Page::RawDump => render_fields(value::data(record), self.max_dump_lines),
        }
    }
}

/// Render `page` with the process-wide reason-code table.
pub fn render(record: &Record, page: Page) -> String {
    Renderer::default().render(record, page)
}

/// Render `page` with an explicit reason-code table.
pub fn render_with(record: &Record, page: Page, states: &PartyStateTable) -> String {
    Renderer::new(states).render(record, page)
}

fn heading(name: &str) -> String {
    format!("<b>━━━ {name} ━━━</b>")
}

fn row(label: &str, value: &str) -> String {
    format!("<b>{label}:</b> {value}")
}

fn row_code(label: &str, value: &str) -> String {
    if value == PLACEHOLDER {
        row(label, value)
    } else {
        format!("<b>{label}:</b> <code>{value}</code>")
    }
}

fn title(icon: &str, page: Page, record: &Value) -> String {
    format!("<b>{icon} {}: {}</b>", page.title(), card::display_name(record))
}
