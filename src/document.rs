//! The document type held by every record.
//!
//! Documents are deliberately dynamic: an ordered string-keyed JSON object
//! whose values may be any JSON-compatible variant. Structure is enforced
//! only by an optionally bound schema, at save time.

use serde_json::Value;

/// A record's document: an ordered mapping of field name to JSON value.
///
/// `serde_json` is built with `preserve_order`, so iteration follows
/// insertion order rather than sorting by key.
pub type Document = serde_json::Map<String, Value>;

/// Returns the JSON type name of a value, for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
