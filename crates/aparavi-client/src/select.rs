//! Best-effort SELECT-clause rewriting.
//!
//! Tagging needs `objectId` and `instanceId` in every result row, but
//! callers hand us arbitrary AQL. This splices missing fields into the
//! SELECT list textually; no parsing of the dialect is attempted. The
//! transform is isolated here so a real parser could replace it without
//! touching callers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Splits a query into SELECT prefix, field list, and the remainder
/// starting at FROM or WHERE. The discovery queries have no FROM clause,
/// so WHERE alone also terminates the field list.
static SELECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^(\s*select\s+)(.*?)(\s+(?:from|where)\s+.*)$").expect("static regex")
});

/// Ensure the SELECT clause includes each of `required`.
///
/// `SELECT *` and non-SELECT text are returned unchanged; field presence is
/// checked by case-insensitive containment, so aliased expressions count.
pub fn ensure_fields_selected(query: &str, required: &[&str]) -> String {
    let Some(captures) = SELECT_RE.captures(query) else {
        return query.to_string();
    };

    let prefix = &captures[1];
    let fields = &captures[2];
    let rest = &captures[3];

    if fields.trim() == "*" {
        return query.to_string();
    }

    let fields_lower = fields.to_lowercase();
    let mut rewritten = fields.trim_end().to_string();
    for field in required {
        if !fields_lower.contains(&field.to_lowercase()) {
            rewritten.push_str(", ");
            rewritten.push_str(field);
        }
    }

    format!("{}{}{}", prefix, rewritten, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &[&str] = &["objectId", "instanceId"];

    #[test]
    fn test_appends_missing_fields() {
        let query = "SELECT name FROM STORE('/') WHERE ClassID = 'idxobject'";
        assert_eq!(
            ensure_fields_selected(query, REQUIRED),
            "SELECT name, objectId, instanceId FROM STORE('/') WHERE ClassID = 'idxobject'"
        );
    }

    #[test]
    fn test_keeps_present_fields() {
        let query = "SELECT name, objectId, instanceId FROM STORE('/') WHERE size > 0";
        assert_eq!(ensure_fields_selected(query, REQUIRED), query);
    }

    #[test]
    fn test_appends_only_the_missing_one() {
        let query = "SELECT objectId, name WHERE name IS NOT NULL";
        assert_eq!(
            ensure_fields_selected(query, REQUIRED),
            "SELECT objectId, name, instanceId WHERE name IS NOT NULL"
        );
    }

    #[test]
    fn test_star_select_left_alone() {
        let query = "SELECT * FROM STORE('/') WHERE size > 0";
        assert_eq!(ensure_fields_selected(query, REQUIRED), query);
    }

    #[test]
    fn test_case_insensitive_presence_check() {
        let query = "select OBJECTID, INSTANCEID from STORE('/') where size > 0";
        assert_eq!(ensure_fields_selected(query, REQUIRED), query);
    }

    #[test]
    fn test_non_select_text_unchanged() {
        assert_eq!(ensure_fields_selected("not a query", REQUIRED), "not a query");
    }
}
