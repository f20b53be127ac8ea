//! Copy-paste friendly exports: a requisites block and a CRM field list.

use serde_json::Value;

use super::card::{address, display_name, status};
use super::state::PartyStateTable;
use super::value::{data, field, first_field, format_date, lookup};
use crate::types::Page;

/// Requisites as a `<pre>` block, ready to paste into a contract.
pub(super) fn render_requisites(record: &Value) -> String {
    let data = data(record);
    let lines = [
        format!("Name: {}", first_field(data, &["name.full_with_opf", "name.short_with_opf"])),
        format!("INN: {}", field(data, "inn")),
        format!("KPP: {}", field(data, "kpp")),
        format!("OGRN: {}", field(data, "ogrn")),
        format!("OKPO: {}", field(data, "okpo")),
        format!("Legal address: {}", address(data)),
        format!(
            "Manager: {} {}",
            field(data, "management.post"),
            field(data, "management.name")
        ),
    ];
    format!(
        "<b>📤 {}: {}</b>\n<pre>{}</pre>",
        Page::Export.title(),
        display_name(record),
        lines.join("\n")
    )
}

/// `key=value` lines using stable field names for CRM import.
pub(super) fn render_crm(record: &Value, states: &PartyStateTable) -> String {
    let data = data(record);
    let fields = [
        ("name", display_name(record)),
        ("full_name", first_field(data, &["name.full_with_opf", "name.full"])),
        ("inn", field(data, "inn")),
        ("kpp", field(data, "kpp")),
        ("ogrn", field(data, "ogrn")),
        ("type", field(data, "type")),
        ("status", status(data, states)),
        ("registered", format_date(lookup(data, "state.registration_date"))),
        ("okved", field(data, "okved")),
        ("address", address(data)),
        ("manager", field(data, "management.name")),
        ("manager_post", field(data, "management.post")),
        ("phone", field(data, "phones.0.value")),
        ("email", field(data, "emails.0.value")),
    ];
    let body: Vec<String> = fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!(
        "<b>🗂 {}</b>\n<pre>{}</pre>",
        Page::Crm.title(),
        body.join("\n")
    )
}
