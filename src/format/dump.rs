//! Flattened listing of every field in a record.

use serde_json::Value;

use super::value::{PLACEHOLDER, escape_html};
use crate::types::Page;

/// Default number of field lines before the listing is cut.
pub const DEFAULT_MAX_LINES: usize = 120;

/// Shown for a nested value that reached the leaf position.
const NESTED_MARKER: &str = "{…}";

/// Every leaf of `value` as `path: value`, in pre-order.
///
/// Object keys join with `.`, array items use `[i]`. After `max_lines`
/// lines a final `… and N more fields` line reports the remainder.
pub fn render_fields(value: &Value, max_lines: usize) -> String {
    let mut leaves = Vec::new();
    collect(value, String::new(), &mut leaves);

    let total = leaves.len();
    let mut lines = vec![format!("<b>🧾 {}</b>", Page::RawDump.title())];
    if total == 0 {
        lines.push(PLACEHOLDER.to_string());
        return lines.join("\n");
    }
    lines.extend(
        leaves
            .iter()
            .take(max_lines)
            .map(|(path, leaf)| format!("{}: {}", escape_html(path), leaf_text(leaf))),
    );
    if total > max_lines {
        lines.push(format!("… and {} more fields", total - max_lines));
    }
    lines.join("\n")
}

fn collect<'a>(value: &'a Value, path: String, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                collect(child, child_path, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                collect(child, format!("{path}[{i}]"), out);
            }
        }
        _ if path.is_empty() => {}
        _ => out.push((path, value)),
    }
}

fn leaf_text(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::String(s) if s.trim().is_empty() => PLACEHOLDER.to_string(),
        Value::String(s) => escape_html(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Array(_) | Value::Object(_) => NESTED_MARKER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_use_dots_and_indexes() {
        let value = json!({
            "name": {"full_with_opf": "ООО Тест"},
            "phones": [{"value": "+7 900 000-00-00"}],
            "empty": [],
            "none": null
        });
        let text = render_fields(&value, DEFAULT_MAX_LINES);
        assert!(text.contains("name.full_with_opf: ООО Тест"));
        assert!(text.contains("phones[0].value: +7 900 000-00-00"));
        assert!(text.contains("empty: []"));
        assert!(text.contains("none: —"));
        assert!(!text.contains("more fields"));
    }

    #[test]
    fn limit_appends_remainder_line() {
        let value = json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5});
        let text = render_fields(&value, 3);
        assert!(text.contains("a: 1"));
        assert!(!text.contains("d: 4"));
        assert!(text.ends_with("… and 2 more fields"));
    }

    #[test]
    fn values_are_escaped() {
        let text = render_fields(&json!({"x": "<b>"}), 10);
        assert!(text.contains("x: &lt;b&gt;"));
    }

    #[test]
    fn empty_record() {
        assert!(render_fields(&json!({}), 10).ends_with(PLACEHOLDER));
    }
}
