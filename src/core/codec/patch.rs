//! Recursive document merging

use super::document::ConfigDocument;
use serde_json::Value;

/// Deep-merges each overlay into `base`, in order
///
/// Where both sides hold documents under the same key they are merged
/// recursively; in every other case the overlay value replaces the base
/// value. Lists are replaced wholesale, never merged element-wise.
///
/// # Examples
///
/// ```
/// use ganesha_exports::core::codec::patch;
/// use serde_json::json;
///
/// let base = json!({"a": {"x": 1, "y": 2}}).as_object().cloned().unwrap();
/// let overlay = json!({"a": {"y": 3, "z": 4}}).as_object().cloned().unwrap();
/// let merged = patch(base, [&overlay]);
/// assert_eq!(merged, json!({"a": {"x": 1, "y": 3, "z": 4}}).as_object().cloned().unwrap());
/// ```
pub fn patch<'a, I>(mut base: ConfigDocument, overlays: I) -> ConfigDocument
where
    I: IntoIterator<Item = &'a ConfigDocument>,
{
    for overlay in overlays {
        merge(&mut base, overlay);
    }
    base
}

/// Deep-merges a single overlay into `base` in place
pub fn merge(base: &mut ConfigDocument, overlay: &ConfigDocument) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
