//! Structured configuration documents
//!
//! A [`ConfigDocument`] is a JSON object: keys map to scalars, nested
//! documents, or lists of documents (repeated blocks).

use serde_json::{Map, Value};

/// Structured form of a configuration file
pub type ConfigDocument = Map<String, Value>;

/// Looks up `key` ignoring ASCII case
///
/// An exact match wins over a case-insensitive one.
pub fn get_ci<'a>(doc: &'a ConfigDocument, key: &str) -> Option<&'a Value> {
    doc.get(key).or_else(|| {
        doc.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Mutable variant of [`get_ci`]
pub fn get_ci_mut<'a>(doc: &'a mut ConfigDocument, key: &str) -> Option<&'a mut Value> {
    let actual = actual_key(doc, key)?;
    doc.get_mut(&actual)
}

/// Returns the key as written in `doc` that matches `key` ignoring ASCII case
pub fn actual_key(doc: &ConfigDocument, key: &str) -> Option<String> {
    if doc.contains_key(key) {
        return Some(key.to_string());
    }
    doc.keys().find(|k| k.eq_ignore_ascii_case(key)).cloned()
}

/// Follows a path of keys through nested documents, ignoring ASCII case
pub fn lookup<'a>(doc: &'a ConfigDocument, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = doc;
    for key in parents {
        current = get_ci(current, key)?.as_object()?;
    }
    get_ci(current, last)
}

/// Collects every leaf value with its dotted key path, depth first
///
/// Nested documents are descended into; list elements are addressed as
/// `key[index]`.
///
/// # Examples
///
/// ```
/// use ganesha_exports::core::codec::walk;
/// use serde_json::json;
///
/// let doc = json!({"EXPORT": {"Path": "/a", "CLIENT": {"Clients": "*"}}});
/// let leaves = walk(doc.as_object().unwrap());
/// let paths: Vec<_> = leaves.iter().map(|(p, _)| p.as_str()).collect();
/// assert_eq!(paths, vec!["EXPORT.CLIENT.Clients", "EXPORT.Path"]);
/// ```
pub fn walk(doc: &ConfigDocument) -> Vec<(String, &Value)> {
    let mut leaves = Vec::new();
    walk_into(doc, "", &mut leaves);
    leaves
}

fn walk_into<'a>(doc: &'a ConfigDocument, prefix: &str, leaves: &mut Vec<(String, &'a Value)>) {
    for (key, value) in doc {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        walk_value(value, path, leaves);
    }
}

fn walk_value<'a>(value: &'a Value, path: String, leaves: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) => walk_into(map, &path, leaves),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk_value(item, format!("{path}[{index}]"), leaves);
            }
        }
        leaf => leaves.push((path, leaf)),
    }
}
