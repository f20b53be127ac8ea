//! The short card and the detailed overview.

use serde_json::Value;

use super::state::{PartyStateTable, format_company_state};
use super::value::{
    PLACEHOLDER, contact_values, data, date_text, escape_html, field, first_field, format_date,
    format_money, list, lookup, scalar_text,
};
use super::{heading, row, row_code};

/// Display name of a suggestion, preferring the short name with legal
/// form and falling back to the suggestion's own `value`.
pub(super) fn display_name(record: &Value) -> String {
    let name = first_field(
        data(record),
        &["name.short_with_opf", "name.full_with_opf", "name.short", "name.full"],
    );
    if name != PLACEHOLDER {
        return name;
    }
    scalar_text(record.get("value")).map_or(name, |value| escape_html(&value))
}

pub(super) fn entity_label(data: &Value) -> &'static str {
    match lookup(data, "type").and_then(Value::as_str) {
        Some("INDIVIDUAL") => "individual entrepreneur",
        Some("LEGAL") => "legal entity",
        _ => PLACEHOLDER,
    }
}

pub(super) fn status(data: &Value, states: &PartyStateTable) -> String {
    format_company_state(
        lookup(data, "state"),
        lookup(data, "type").and_then(Value::as_str),
        states,
    )
}

pub(super) fn address(data: &Value) -> String {
    first_field(data, &["address.unrestricted_value", "address.value"])
}

fn manager(data: &Value) -> String {
    let name = scalar_text(lookup(data, "management.name"));
    let post = scalar_text(lookup(data, "management.post"));
    match (post, name) {
        (Some(post), Some(name)) => escape_html(&format!("{post}: {name}")),
        (None, Some(name)) => escape_html(&name),
        // individual entrepreneurs have no management block
        _ if lookup(data, "type").and_then(Value::as_str) == Some("INDIVIDUAL") => {
            super::value::person_name(data)
        }
        _ => PLACEHOLDER.to_string(),
    }
}

fn okved(data: &Value) -> String {
    let code = field(data, "okved");
    let main_name = list(data, "okveds")
        .iter()
        .find(|o| o.get("main").and_then(Value::as_bool) == Some(true))
        .and_then(|o| scalar_text(o.get("name")));
    match main_name {
        Some(name) if code != PLACEHOLDER => format!("{code} {}", escape_html(&name)),
        _ => code,
    }
}

fn branches_summary(data: &Value) -> String {
    let count = scalar_text(lookup(data, "branch_count")).filter(|c| c != "0");
    match (lookup(data, "branch_type").and_then(Value::as_str), count) {
        (Some("MAIN"), Some(count)) => {
            format!("head office, branches: {}", escape_html(&count))
        }
        (Some("MAIN"), None) => "head office".to_string(),
        (Some("BRANCH"), _) => "branch".to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn capital(data: &Value) -> String {
    let amount = format_money(lookup(data, "capital.value"), None);
    match scalar_text(lookup(data, "capital.type")) {
        Some(kind) if amount != PLACEHOLDER => format!("{amount} ({})", escape_html(&kind)),
        _ => amount,
    }
}

/// Compact card shown first after a successful lookup.
pub(super) fn render_card(record: &Value, states: &PartyStateTable) -> String {
    let data = data(record);
    let mut lines = vec![
        format!("<b>📋 {}</b>", display_name(record)),
        String::new(),
        row_code("INN", &field(data, "inn")),
        row_code("OGRN", &field(data, "ogrn")),
        row_code("KPP", &field(data, "kpp")),
        row("Status", &status(data, states)),
        row("Registered", &format_date(lookup(data, "state.registration_date"))),
    ];
    if let Some(liquidated) = date_text(lookup(data, "state.liquidation_date")) {
        lines.push(row("Liquidated", &liquidated));
    }
    lines.extend([
        row("Address", &address(data)),
        row("Manager", &manager(data)),
        row("OKVED", &okved(data)),
        row("Employees", &field(data, "employee_count")),
        row(
            "Revenue",
            &format_money(lookup(data, "finance.revenue"), lookup(data, "finance.year")),
        ),
    ]);
    lines.join("\n")
}

/// Everything on one page, grouped into sections, with counters for the
/// lists that have dedicated pages.
pub(super) fn render_details(record: &Value, states: &PartyStateTable) -> String {
    let data = data(record);
    let documents = match lookup(data, "documents") {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.values().filter(|v| v.is_object()).count(),
        _ => 0,
    };
    let mut lines = vec![
        format!("<b>📋 {}</b>", display_name(record)),
        String::new(),
        row("Full name", &first_field(data, &["name.full_with_opf", "name.full"])),
        row("Type", entity_label(data)),
        row("Legal form", &first_field(data, &["opf.full", "opf.short"])),
        row("Status", &status(data, states)),
        row("Registered", &format_date(lookup(data, "state.registration_date"))),
    ];
    if let Some(liquidated) = date_text(lookup(data, "state.liquidation_date")) {
        lines.push(row("Liquidated", &liquidated));
    }
    lines.extend([
        String::new(),
        heading("Requisites"),
        row_code("INN", &field(data, "inn")),
        row_code("KPP", &field(data, "kpp")),
        row_code("OGRN", &field(data, "ogrn")),
        row("OGRN date", &format_date(lookup(data, "ogrn_date"))),
        row_code("OKPO", &field(data, "okpo")),
        row_code("OKTMO", &field(data, "oktmo")),
        row_code("OKATO", &field(data, "okato")),
        String::new(),
        heading("Address"),
        address(data),
        String::new(),
        heading("Management"),
        row("Post", &field(data, "management.post")),
        row("Name", &field(data, "management.name")),
        String::new(),
        heading("Finance"),
        row("Charter capital", &capital(data)),
        row("Employees", &field(data, "employee_count")),
        String::new(),
        heading("Activity"),
        row(
            "OKVED",
            &format!("{} (version {})", okved(data), field(data, "okved_type")),
        ),
        String::new(),
        heading("Contacts"),
        row("Phones", &contact_values(data, "phones")),
        row("Email", &contact_values(data, "emails")),
        String::new(),
        heading("Branches"),
        branches_summary(data),
        String::new(),
        format!("Founders in card: {}", list(data, "founders").len()),
        format!("Managers in history: {}", list(data, "managers").len()),
        format!(
            "Licenses/documents: {}/{documents}",
            list(data, "licenses").len()
        ),
    ]);
    lines.join("\n")
}
