//! Single-topic pages.

use serde_json::Value;

use super::card::{address, display_name};
use super::value::{
    PLACEHOLDER, contact_values, data, escape_html, field, first_field, format_date, format_money,
    list, lookup, name_or_scalar, person_name, scalar_text,
};
use super::{heading, row, row_code, title};
use crate::types::Page;

pub(super) fn render_contacts(record: &Value) -> String {
    let data = data(record);
    [
        title("📞", Page::Contacts, record),
        row("Address", &address(data)),
        row("Postal code", &field(data, "address.data.postal_code")),
        row("Phones", &contact_values(data, "phones")),
        row("Email", &contact_values(data, "emails")),
    ]
    .join("\n")
}

pub(super) fn render_finance(record: &Value) -> String {
    let data = data(record);
    let year = lookup(data, "finance.year");
    [
        title("💰", Page::Finance, record),
        row("Charter capital", &format_money(lookup(data, "capital.value"), None)),
        row(
            "Revenue",
            &format_money(
                lookup(data, "finance.revenue").or_else(|| lookup(data, "finance.income")),
                year,
            ),
        ),
        row("Expenses", &format_money(lookup(data, "finance.expense"), year)),
        row("Tax arrears", &format_money(lookup(data, "finance.debt"), year)),
        row("Penalties", &format_money(lookup(data, "finance.penalty"), year)),
        row("Tax system", &name_or_scalar(data, "finance.tax_system")),
        row("Employees", &field(data, "employee_count")),
    ]
    .join("\n")
}

fn share(founder: &Value) -> String {
    let Some(share) = founder.get("share").filter(|s| s.is_object()) else {
        return PLACEHOLDER.to_string();
    };
    let kind = share.get("type").and_then(Value::as_str);
    match kind {
        Some("PERCENT") => match scalar_text(share.get("value")) {
            Some(value) => format!("{}%", escape_html(&value)),
            None => PLACEHOLDER.to_string(),
        },
        Some("FRACTION") => match (
            scalar_text(share.get("numerator")),
            scalar_text(share.get("denominator")),
        ) {
            (Some(n), Some(d)) => escape_html(&format!("{n}/{d}")),
            _ => PLACEHOLDER.to_string(),
        },
        _ => format_money(share.get("value"), None),
    }
}

pub(super) fn render_founders(record: &Value) -> String {
    let data = data(record);
    let founders = list(data, "founders");
    let mut lines = vec![title("👥", Page::Founders, record)];
    if founders.is_empty() {
        lines.push("No founders in the record.".to_string());
        return lines.join("\n");
    }
    for (i, founder) in founders.iter().enumerate() {
        lines.push(format!(
            "{}. {} (INN {}), share: {}",
            i + 1,
            person_name(founder),
            field(founder, "inn"),
            share(founder)
        ));
    }
    lines.join("\n")
}

pub(super) fn render_management(record: &Value) -> String {
    let data = data(record);
    let mut lines = vec![
        title("👔", Page::Management, record),
        heading("Current manager"),
        row("Name", &field(data, "management.name")),
        row("Post", &field(data, "management.post")),
        row("Since", &format_date(lookup(data, "management.start_date"))),
    ];
    if let Some(disqualified) = scalar_text(lookup(data, "management.disqualified")) {
        lines.push(row("Disqualified", &escape_html(&disqualified)));
    }
    lines.push(String::new());
    lines.push(heading("History"));

    let managers = list(data, "managers");
    if managers.is_empty() {
        lines.push("No management history in the record.".to_string());
    }
    for manager in managers {
        lines.push(format!(
            "• {}, {} (since {})",
            person_name(manager),
            field(manager, "post"),
            format_date(manager.get("start_date"))
        ));
    }
    lines.join("\n")
}

pub(super) fn render_taxes(record: &Value) -> String {
    let data = data(record);
    let year = lookup(data, "finance.year");
    [
        title("🧾", Page::Taxes, record),
        heading("Tax authority"),
        row(
            "Registered with",
            &first_field(data, &["authorities.fts_registration.name", "authorities.fts_report.name"]),
        ),
        row_code("Authority code", &field(data, "authorities.fts_registration.code")),
        row("Authority address", &field(data, "authorities.fts_registration.address")),
        row(
            "Registered since",
            &format_date(lookup(data, "documents.fts_registration.issue_date")),
        ),
        String::new(),
        row(
            "Tax system",
            &first_of(&[
                name_or_scalar(data, "finance.tax_system"),
                name_or_scalar(data, "tax_system"),
            ]),
        ),
        row(
            "Tax arrears",
            &format_money(
                lookup(data, "fns_debt.debt").or_else(|| lookup(data, "finance.debt")),
                year,
            ),
        ),
        row("Penalties", &format_money(lookup(data, "finance.penalty"), year)),
    ]
    .join("\n")
}

pub(super) fn render_litigation(record: &Value) -> String {
    let data = data(record);
    let year = lookup(data, "finance.year");
    [
        title("⚖️", Page::Litigation, record),
        row("Arbitration cases", PLACEHOLDER),
        row("Enforcement proceedings", PLACEHOLDER),
        row("Tax arrears", &format_money(lookup(data, "finance.debt"), year)),
        row("Penalties", &format_money(lookup(data, "finance.penalty"), year)),
        row("Invalid record flag", &field(data, "invalid")),
        String::new(),
        "Court and enforcement data is not part of the registry record; use the AI check."
            .to_string(),
    ]
    .join("\n")
}

fn license_line(license: &Value) -> String {
    let number = [
        scalar_text(license.get("series")),
        scalar_text(license.get("number")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");
    let activity = list(license, "activities")
        .first()
        .and_then(|a| scalar_text(Some(a)))
        .map(|a| escape_html(&a))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    format!(
        "• №{} from {}, {}; {}",
        if number.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            escape_html(&number)
        },
        format_date(license.get("issue_date")),
        field(license, "issue_authority"),
        activity
    )
}

fn document_line(name: Option<&str>, document: &Value) -> String {
    let kind = name
        .map(escape_html)
        .unwrap_or_else(|| first_field(document, &["type", "name"]));
    format!(
        "• {kind}: {} {} from {}",
        field(document, "series"),
        field(document, "number"),
        format_date(document.get("issue_date"))
    )
}

pub(super) fn render_documents(record: &Value) -> String {
    let data = data(record);
    let mut lines = vec![title("📄", Page::Documents, record), heading("Licenses")];
    let licenses = list(data, "licenses");
    if licenses.is_empty() {
        lines.push("No licenses in the record.".to_string());
    }
    lines.extend(licenses.iter().map(license_line));

    lines.push(String::new());
    lines.push(heading("Documents"));
    let documents: Vec<String> = match lookup(data, "documents") {
        Some(Value::Array(items)) => items.iter().map(|d| document_line(None, d)).collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(_, d)| d.is_object())
            .map(|(name, d)| document_line(Some(name), d))
            .collect(),
        _ => Vec::new(),
    };
    if documents.is_empty() {
        lines.push("No documents in the record.".to_string());
    }
    lines.extend(documents);
    lines.join("\n")
}

fn party_line(party: &Value) -> String {
    format!(
        "• {} (INN {}, OGRN {})",
        first_field(party, &["name", "name.short_with_opf"]),
        field(party, "inn"),
        field(party, "ogrn")
    )
}

pub(super) fn render_successor(record: &Value) -> String {
    let data = data(record);
    let mut lines = vec![title("🔁", Page::Successor, record), heading("Successors")];
    let successors = list(data, "successors");
    if successors.is_empty() {
        lines.push("No successors in the record.".to_string());
    }
    lines.extend(successors.iter().map(party_line));

    lines.push(String::new());
    lines.push(heading("Predecessors"));
    let predecessors = list(data, "predecessors");
    if predecessors.is_empty() {
        lines.push("No predecessors in the record.".to_string());
    }
    lines.extend(predecessors.iter().map(party_line));
    lines.join("\n")
}

/// One line per branch record, or a fixed message for an empty list.
pub fn format_branches_list(branches: &[Value]) -> String {
    if branches.is_empty() {
        return "No branches found.".to_string();
    }
    let mut lines = vec![format!("<b>🏢 Branches: {}</b>", branches.len())];
    for (i, branch) in branches.iter().enumerate() {
        let data = data(branch);
        lines.push(format!(
            "{}. {}, KPP {}, {}",
            i + 1,
            display_name(branch),
            field(data, "kpp"),
            address(data)
        ));
    }
    lines.join("\n")
}

fn first_of(candidates: &[String]) -> String {
    candidates
        .iter()
        .find(|c| c.as_str() != PLACEHOLDER)
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
