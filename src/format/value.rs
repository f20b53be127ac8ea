//! Optional-path access and scalar formatting for untyped records.
//!
//! Every helper here is total: a missing key, a `null`, a blank string or a
//! value of the wrong JSON type all end up as [`PLACEHOLDER`] (or `None` for
//! the `Option`-returning accessors). Strings that reach the output are HTML
//! escaped exactly once, in this module.

use chrono::{DateTime, Datelike, Local};
use serde_json::Value;

/// Shown for every absent value.
pub const PLACEHOLDER: &str = "—";

/// Currency suffix of monetary amounts.
pub const CURRENCY: &str = "₽";

/// Escape text for the transport's HTML parse mode.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Follow a dotted path (`"name.short_with_opf"`, `"phones.0.value"`).
///
/// Numeric segments index into arrays. Any missing step yields `None`.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// The `data` object of a suggestion, or the record itself when it has none.
pub fn data(record: &Value) -> &Value {
    match record.get("data") {
        Some(data @ Value::Object(_)) => data,
        _ => record,
    }
}

/// Scalar as trimmed, non-empty, unescaped text.
pub fn scalar_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Escaped scalar at `path`, or the placeholder.
pub fn field(value: &Value, path: &str) -> String {
    text_or_placeholder(scalar_text(lookup(value, path)))
}

/// Escaped scalar of the first non-empty path, or the placeholder.
pub fn first_field(value: &Value, paths: &[&str]) -> String {
    text_or_placeholder(paths.iter().find_map(|p| scalar_text(lookup(value, p))))
}

/// Escape `text` or fall back to the placeholder.
pub fn text_or_placeholder(text: Option<String>) -> String {
    text.map_or_else(|| PLACEHOLDER.to_string(), |t| escape_html(&t))
}

/// Escaped scalar at `path`, or the `name` field of an object there.
///
/// Several registry fields are either a bare string or `{ "name": ... }`
/// depending on the tariff (`tax_system`, `opf`).
pub fn name_or_scalar(value: &Value, path: &str) -> String {
    let target = lookup(value, path);
    text_or_placeholder(
        scalar_text(target)
            .or_else(|| target.and_then(|t| scalar_text(t.get("name"))))
            .or_else(|| target.and_then(|t| scalar_text(t.get("full")))),
    )
}

/// Items of the array at `path`; anything else counts as empty.
pub fn list<'a>(value: &'a Value, path: &str) -> &'a [Value] {
    match lookup(value, path) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// Person's name from `name` or a `fio {surname, name, patronymic}` object.
pub fn person_name(person: &Value) -> String {
    if let Some(name) = scalar_text(person.get("name")) {
        return escape_html(&name);
    }
    let fio: Vec<String> = ["surname", "name", "patronymic"]
        .iter()
        .filter_map(|part| scalar_text(lookup(person, &format!("fio.{part}"))))
        .collect();
    if fio.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        escape_html(&fio.join(" "))
    }
}

/// Comma-joined `value` fields of contact objects (`phones`, `emails`).
pub fn contact_values(value: &Value, path: &str) -> String {
    let values: Vec<String> = list(value, path)
        .iter()
        .filter_map(|item| scalar_text(item.get("value")).or_else(|| scalar_text(Some(item))))
        .collect();
    if values.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        escape_html(&values.join(", "))
    }
}

/// Parse an amount from a JSON number or a human-formatted numeric string.
///
/// Spaces (regular and non-breaking) and underscores are thousands
/// separators. A comma is a decimal separator unless a point is also
/// present, in which case commas are thousands separators.
pub fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let compact: String = s
                .chars()
                .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}' | '_'))
                .collect();
            let normalized = if compact.contains('.') {
                compact.replace(',', "")
            } else {
                compact.replace(',', ".")
            };
            normalized.parse::<f64>().ok()?
        }
        _ => return None,
    };
    amount.is_finite().then_some(amount)
}

/// Whole-ruble amount with space-grouped thousands: `1 234 567 ₽`.
///
/// Kopecks are rounded half to even, so `1 200,50` shows as `1 200 ₽` and
/// `1 201,50` as `1 202 ₽`.
///
/// Non-numeric input is shown verbatim (escaped); a missing value is the
/// placeholder. A year, when present, is appended in parentheses.
pub fn format_money(value: Option<&Value>, year: Option<&Value>) -> String {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return PLACEHOLDER.to_string();
    };
    let amount = match parse_amount(value) {
        Some(amount) => format!("{} {CURRENCY}", group_thousands(amount)),
        None => match scalar_text(Some(value)) {
            Some(raw) => escape_html(&raw),
            None => return PLACEHOLDER.to_string(),
        },
    };
    match scalar_text(year) {
        Some(year) => format!("{amount} ({})", escape_html(&year)),
        None => amount,
    }
}

fn group_thousands(amount: f64) -> String {
    let rounded = format!("{amount:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(digits) if digits.chars().any(|c| c != '0') => ("-", digits),
        Some(digits) => ("", digits),
        None => ("", rounded.as_str()),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

/// Epoch milliseconds as a local `DD.MM.YYYY` date.
///
/// Missing, zero, non-numeric and out-of-range timestamps give the
/// placeholder.
pub fn format_date(value: Option<&Value>) -> String {
    date_text(value).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Like [`format_date`], but `None` when there is no usable timestamp.
pub fn date_text(value: Option<&Value>) -> Option<String> {
    let millis = match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if millis == 0 {
        return None;
    }
    let local = DateTime::from_timestamp_millis(millis)?.with_timezone(&Local);
    if !(1..=9999).contains(&local.year()) {
        return None;
    }
    Some(local.format("%d.%m.%Y").to_string())
}
