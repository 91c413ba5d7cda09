//! Decoding of the Data Suite response envelope.
//!
//! The API reports success and failure through two channels: the HTTP
//! status, and a `status` field inside 200-status bodies. A syntactically
//! invalid query surfaces as `{"status":"error","message":"..."}` with
//! HTTP 200, so body status must always be inspected before trusting a
//! transport-level success.
//!
//! Row-returning responses come in several shapes depending on the call
//! (`data.objects`, `data` as a bare list, `results`, `rows`). [`RowSet`]
//! makes the shape explicit instead of duck-typing string keys at every
//! call site.

use serde_json::Value;

/// Status reported inside a 200-status body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// `status: "OK"`.
    Ok,
    /// `status: "error"` with the remote message.
    Error(String),
    /// No `status` field, or an unexpected value.
    Unknown,
}

/// Inspect the body-level status channel.
pub fn remote_status(body: &Value) -> RemoteStatus {
    match body.get("status").and_then(Value::as_str) {
        Some("OK") => RemoteStatus::Ok,
        Some("error") => RemoteStatus::Error(
            body.get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => RemoteStatus::Unknown,
    }
}

/// Result rows extracted from a response body, tagged with the envelope
/// shape they were found under.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    /// Rows under `data.objects`, the standard query envelope.
    Objects(Vec<Value>),
    /// `data` itself is an array (tag-definition listings).
    Data(Vec<Value>),
    /// Rows under a top-level `results` key.
    Results(Vec<Value>),
    /// Rows under a top-level `rows` key.
    Rows(Vec<Value>),
    /// None of the known shapes matched; the original body is preserved so
    /// callers can log or surface it.
    Unrecognized(Value),
}

impl RowSet {
    /// Try each known envelope shape in fixed priority order.
    pub fn decode(body: &Value) -> Self {
        if let Some(objects) = body
            .get("data")
            .and_then(|d| d.get("objects"))
            .and_then(Value::as_array)
        {
            return Self::Objects(objects.clone());
        }
        if let Some(data) = body.get("data").and_then(Value::as_array) {
            return Self::Data(data.clone());
        }
        if let Some(results) = body.get("results").and_then(Value::as_array) {
            return Self::Results(results.clone());
        }
        if let Some(rows) = body.get("rows").and_then(Value::as_array) {
            return Self::Rows(rows.clone());
        }
        Self::Unrecognized(body.clone())
    }

    /// The extracted rows; empty for [`RowSet::Unrecognized`].
    pub fn rows(&self) -> &[Value] {
        match self {
            Self::Objects(rows) | Self::Data(rows) | Self::Results(rows) | Self::Rows(rows) => rows,
            Self::Unrecognized(_) => &[],
        }
    }

    /// First row, if any.
    pub fn first(&self) -> Option<&Value> {
        self.rows().first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_status_ok() {
        let body = json!({"status": "OK", "data": {"objects": []}});
        assert_eq!(remote_status(&body), RemoteStatus::Ok);
    }

    #[test]
    fn test_remote_status_error_with_message() {
        let body = json!({"status": "error", "message": "syntax error"});
        assert_eq!(
            remote_status(&body),
            RemoteStatus::Error("syntax error".to_string())
        );
    }

    #[test]
    fn test_remote_status_error_without_message() {
        let body = json!({"status": "error"});
        assert_eq!(
            remote_status(&body),
            RemoteStatus::Error("Unknown error".to_string())
        );
    }

    #[test]
    fn test_remote_status_unknown() {
        assert_eq!(remote_status(&json!({"data": []})), RemoteStatus::Unknown);
        assert_eq!(remote_status(&json!("plain")), RemoteStatus::Unknown);
    }

    #[test]
    fn test_decode_data_objects_takes_priority() {
        let body = json!({
            "data": {"objects": [{"name": "a"}]},
            "results": [{"name": "ignored"}]
        });
        match RowSet::decode(&body) {
            RowSet::Objects(rows) => assert_eq!(rows.len(), 1),
            other => panic!("expected Objects, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_bare_data_array() {
        let body = json!({"status": "OK", "data": ["tag-a", "tag-b"]});
        match RowSet::decode(&body) {
            RowSet::Data(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected Data, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_results_then_rows() {
        let body = json!({"results": [1, 2, 3]});
        assert!(matches!(RowSet::decode(&body), RowSet::Results(_)));

        let body = json!({"rows": [1]});
        assert!(matches!(RowSet::decode(&body), RowSet::Rows(_)));
    }

    #[test]
    fn test_decode_unrecognized_preserves_body() {
        let body = json!({"unexpected": true});
        match RowSet::decode(&body) {
            RowSet::Unrecognized(original) => assert_eq!(original, body),
            other => panic!("expected Unrecognized, got {:?}", other),
        }
        assert!(RowSet::decode(&body).rows().is_empty());
        assert!(RowSet::decode(&body).first().is_none());
    }
}
