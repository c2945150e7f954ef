// Helpers for NX-OS structured `show` bodies.
//
// Tabular output arrives as `TABLE_<name>.ROW_<name>`, where ROW is an
// object when the table has one row and an array when it has several.

use serde_json::Value;

/// Rows of `body[table][row]`, normalized to a slice-like list.
///
/// Missing tables yield no rows.
pub fn rows<'a>(body: &'a Value, table: &str, row: &str) -> Vec<&'a Value> {
    match body.get(table).and_then(|t| t.get(row)) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    }
}

/// String form of `row[key]`; numbers are rendered, null and absent are `None`.
pub fn field(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
