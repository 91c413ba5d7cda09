//! File-object extraction from query result rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One file instance addressed by the tagging endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    #[serde(rename = "objectId")]
    pub object_id: String,
    #[serde(rename = "instanceId")]
    pub instance_id: i64,
}

/// Key-casing conventions observed in query results.
const OBJECT_ID_KEYS: &[&str] = &["objectId", "object_id", "ObjectId"];
const INSTANCE_ID_KEYS: &[&str] = &["instanceId", "instance_id", "InstanceId"];

fn lookup<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| row.get(key))
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl FileObject {
    /// Extract a file object from one result row.
    ///
    /// Accepts any of the known key casings and coerces both fields; rows
    /// missing a field or failing coercion yield `None` rather than an
    /// error, so callers can skip them.
    pub fn from_row(row: &Value) -> Option<Self> {
        let object_id = lookup(row, OBJECT_ID_KEYS).and_then(coerce_string)?;
        let instance_id = lookup(row, INSTANCE_ID_KEYS).and_then(coerce_integer)?;
        Some(Self {
            object_id,
            instance_id,
        })
    }

    /// Extract every coercible file object from a row collection, dropping
    /// the rest.
    pub fn from_rows(rows: &[Value]) -> Vec<Self> {
        rows.iter().filter_map(Self::from_row).collect()
    }
}
