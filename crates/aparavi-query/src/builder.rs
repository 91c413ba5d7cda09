//! Templated AQL assembly.
//!
//! Pure string synthesis from known-good clause fragments. No parsing or
//! type-checking of the dialect is attempted, and the builder never
//! executes anything. Callers validate and execute through the client.
//!
//! The dialect has a restricted clause set (no DISTINCT, no DATEADD), so
//! time arithmetic is expressed in epoch seconds against `NOW()`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::concepts::{Concept, ConceptSet};

/// Mandatory type filter: every generated file-object query carries
/// exactly one of these.
pub const FILE_OBJECT_FILTER: &str = "ClassID = 'idxobject'";

/// Row cap applied to simple-complexity queries.
pub const SIMPLE_ROW_LIMIT: u32 = 50;

/// Threshold used for "large file" predicates (100 MB).
const LARGE_FILE_BYTES: u64 = 104_857_600;

/// How much of the dialect to exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Capped result set for interactive exploration.
    #[default]
    Simple,
    /// Uncapped result set for full reporting.
    Comprehensive,
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "comprehensive" => Ok(Self::Comprehensive),
            other => Err(format!("Unknown complexity preference: {}", other)),
        }
    }
}

/// SELECT expressions contributed per detected concept.
fn select_fragments(concept: Concept) -> &'static [&'static str] {
    match concept {
        Concept::Duplicates => &["name", "dupCount", "SUM(size)/1073741824 AS wastedGB"],
        Concept::FileSize => &["SUM(size)/1073741824 AS totalSizeGB"],
        Concept::TimeRecent => &["createTime"],
        Concept::TimeOld => &["accessTime"],
        Concept::DataSource => &["node"],
        Concept::FileType => &["extension"],
        Concept::Classification => &["classification"],
    }
}

/// WHERE predicate contributed per detected concept, where one exists.
fn where_fragment(concept: Concept) -> Option<&'static str> {
    match concept {
        Concept::Duplicates => Some("dupCount > 1"),
        Concept::TimeRecent => Some("createTime >= NOW() - 2592000"),
        Concept::TimeOld => Some("accessTime <= NOW() - 31536000"),
        Concept::Classification => {
            Some("classification IS NOT NULL AND classification != 'Unclassified'")
        }
        _ => None,
    }
}

/// GROUP BY expression contributed per detected concept, where one exists.
fn group_by_fragment(concept: Concept) -> Option<&'static str> {
    match concept {
        Concept::DataSource => Some("node"),
        Concept::FileType => Some("extension"),
        Concept::Classification => Some("classification"),
        _ => None,
    }
}

/// Keyword → predicate table scanned over free-text filter hints.
/// First match wins per hint.
const FILTER_KEYWORDS: &[(&str, &str)] = &[
    ("pdf", "extension = 'pdf'"),
    ("excel", "extension IN ('xls', 'xlsx')"),
    ("word", "extension IN ('doc', 'docx')"),
    ("large", "size > 104857600"),
];

/// A generated query with its assembly breakdown, kept for explanation
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuery {
    pub query: String,
    pub select_fields: Vec<String>,
    pub conditions: Vec<String>,
    pub group_by: Vec<String>,
    pub order_by: String,
    pub limit: Option<u32>,
}

impl GeneratedQuery {
    /// Human-readable lines describing how the query was assembled.
    pub fn explanation(&self, concepts: &ConceptSet) -> Vec<String> {
        let mut lines = Vec::new();
        if concepts.is_empty() {
            lines.push("No specific concepts detected; using a general file summary.".to_string());
        } else {
            let names: Vec<&str> = concepts.keys().map(Concept::as_str).collect();
            lines.push(format!("Detected concepts: {}", names.join(", ")));
        }
        lines.push(format!("Selecting: {}", self.select_fields.join(", ")));
        lines.push(format!("Filtering on: {}", self.conditions.join(" AND ")));
        if !self.group_by.is_empty() {
            lines.push(format!("Grouped by: {}", self.group_by.join(", ")));
        }
        lines.push(format!("Ordered by: {}", self.order_by));
        match self.limit {
            Some(limit) => lines.push(format!("Limited to {} rows.", limit)),
            None => lines.push("No row limit (comprehensive mode).".to_string()),
        }
        lines
    }
}

/// Assemble an AQL query from detected concepts, filter hints, the original
/// question, and a complexity preference.
pub fn build_query(
    concepts: &ConceptSet,
    filters: &[String],
    question: &str,
    complexity: Complexity,
) -> GeneratedQuery {
    let question_lower = question.to_lowercase();

    // SELECT: concept fragments in stable order, or the default pair.
    let mut select_fields: Vec<String> = Vec::new();
    for concept in Concept::ALL {
        if concepts.contains_key(&concept) {
            for fragment in select_fragments(concept) {
                if !select_fields.iter().any(|f| f == fragment) {
                    select_fields.push((*fragment).to_string());
                }
            }
        }
    }
    if select_fields.is_empty() {
        select_fields.push("COUNT(name) AS fileCount".to_string());
        select_fields.push("SUM(size)/1073741824 AS totalSizeGB".to_string());
    }

    // WHERE: the mandatory type filter first, then one predicate per
    // matched concept that has one.
    let mut conditions: Vec<String> = vec![FILE_OBJECT_FILTER.to_string()];
    for concept in Concept::ALL {
        if concepts.contains_key(&concept) {
            if let Some(fragment) = where_fragment(concept) {
                conditions.push(fragment.to_string());
            }
        }
    }
    if concepts.contains_key(&Concept::FileSize) && question_lower.contains("large") {
        conditions.push(format!("size > {}", LARGE_FILE_BYTES));
    }

    // Filter hints: first matching keyword per hint, skipping predicates
    // already present.
    for hint in filters {
        let hint_lower = hint.to_lowercase();
        if let Some((_, predicate)) = FILTER_KEYWORDS
            .iter()
            .find(|(keyword, _)| hint_lower.contains(keyword))
        {
            if !conditions.iter().any(|c| c == predicate) {
                conditions.push((*predicate).to_string());
            }
        }
    }

    // GROUP BY: fixed expression per matched concept that has one.
    let mut group_by: Vec<String> = Vec::new();
    for concept in Concept::ALL {
        if concepts.contains_key(&concept) {
            if let Some(fragment) = group_by_fragment(concept) {
                group_by.push(fragment.to_string());
            }
        }
    }

    // ORDER BY: fixed precedence, exactly one clause.
    let order_by = if concepts.contains_key(&Concept::FileSize) {
        "totalSizeGB DESC".to_string()
    } else if concepts.contains_key(&Concept::Duplicates) {
        "dupCount DESC".to_string()
    } else {
        "COUNT(name) DESC".to_string()
    };

    let limit = match complexity {
        Complexity::Simple => Some(SIMPLE_ROW_LIMIT),
        Complexity::Comprehensive => None,
    };

    let mut query = format!(
        "SELECT {} FROM STORE('/') WHERE {}",
        select_fields.join(", "),
        conditions.join(" AND ")
    );
    if !group_by.is_empty() {
        query.push_str(&format!(" GROUP BY {}", group_by.join(", ")));
    }
    query.push_str(&format!(" ORDER BY {}", order_by));
    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {}", limit));
    }

    debug!(%query, "assembled AQL query");

    GeneratedQuery {
        query,
        select_fields,
        conditions,
        group_by,
        order_by,
        limit,
    }
}
