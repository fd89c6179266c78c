//! Renders a [`ConfigDocument`] as configuration text

use super::document::ConfigDocument;
use super::lexer::is_delimiter;
use super::parser::is_number_literal;
use serde_json::Value;

/// Indentation width per nesting level
const INDENT_WIDTH: usize = 2;

/// Serializes a document
///
/// One line per scalar key, `KEY {` ... `}` for nested documents, one block
/// per element for lists of documents. `null` values are left out.
///
/// # Examples
///
/// ```
/// use ganesha_exports::core::codec::serialize;
/// use serde_json::json;
///
/// let doc = json!({"EXPORT": {"Export_Id": 101, "Path": "/exports/share1"}});
/// assert_eq!(
///     serialize(doc.as_object().unwrap()),
///     "EXPORT {\n  Export_Id = 101;\n  Path = /exports/share1;\n}\n"
/// );
/// ```
pub fn serialize(doc: &ConfigDocument) -> String {
    let mut out = String::new();
    write_block(doc, 0, &mut out);
    out
}

fn write_block(doc: &ConfigDocument, depth: usize, out: &mut String) {
    let indent = " ".repeat(depth * INDENT_WIDTH);
    for (key, value) in doc {
        match value {
            Value::Null => {}
            Value::Object(nested) => write_nested(key, nested, depth, out),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                for nested in items.iter().filter_map(Value::as_object) {
                    write_nested(key, nested, depth, out);
                }
            }
            Value::Array(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(render_scalar)
                    .collect();
                if !rendered.is_empty() {
                    out.push_str(&format!("{indent}{key} = {};\n", rendered.join(", ")));
                }
            }
            scalar => out.push_str(&format!("{indent}{key} = {};\n", render_scalar(scalar))),
        }
    }
}

fn write_nested(key: &str, nested: &ConfigDocument, depth: usize, out: &mut String) {
    let indent = " ".repeat(depth * INDENT_WIDTH);
    out.push_str(&format!("{indent}{key} {{\n"));
    write_block(nested, depth + 1, out);
    out.push_str(&format!("{indent}}}\n"));
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) if is_bare_safe(s) => s.clone(),
        Value::String(s) => quote(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Structured values inside a scalar list have no native syntax
        nested => quote(&nested.to_string()),
    }
}

/// True if `s` reads back as exactly this string when written unquoted
fn is_bare_safe(s: &str) -> bool {
    !s.is_empty()
        && !s.chars().any(|c| is_delimiter(c) || c == '\\' || c.is_control())
        && s != "true"
        && s != "false"
        && !is_number_literal(s)
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
