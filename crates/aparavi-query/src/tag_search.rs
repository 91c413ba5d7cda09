//! Tag-membership search queries.
//!
//! `userTags` stores tags as a `;`-delimited string, so membership tests
//! are LIKE patterns over `%;tag;%`.

use serde::{Deserialize, Serialize};

use aparavi_core::clean_tag_name;

use crate::builder::FILE_OBJECT_FILTER;

/// Fields returned by tag-search queries.
const TAG_SEARCH_FIELDS: &str = "name, parentPath, size, userTags, objectId, instanceId";

/// How multiple include-tags combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagLogic {
    /// Any of the tags matches.
    #[default]
    Or,
    /// All of the tags must match.
    And,
}

impl std::str::FromStr for TagLogic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OR" => Ok(Self::Or),
            "AND" => Ok(Self::And),
            other => Err(format!("Unknown tag logic: {}", other)),
        }
    }
}

/// Tag predicates for a file search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagSearchFilters {
    #[serde(default)]
    pub include_tags: Vec<String>,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
    #[serde(default)]
    pub tag_logic: TagLogic,
}

fn tag_predicate(tag: &str, negated: bool) -> String {
    let operator = if negated { "NOT LIKE" } else { "LIKE" };
    format!("userTags {} '%;{};%'", operator, tag)
}

/// Build a file-search query over tag membership.
///
/// Include-tags combine into one parenthesized OR group by default; in AND
/// mode each becomes an independent top-level condition instead. The
/// asymmetry (AND mode skips the parenthesization) matches the observed
/// behavior of the system and is kept deliberately. Exclude-tags always
/// emit NOT LIKE predicates. Everything is AND-joined with the mandatory
/// type filter and any caller-supplied conditions.
pub fn build_tag_search_query(
    filters: &TagSearchFilters,
    additional_filters: &[String],
    limit: Option<u32>,
) -> String {
    let include: Vec<String> = filters
        .include_tags
        .iter()
        .filter_map(|t| clean_tag_name(t))
        .collect();
    let exclude: Vec<String> = filters
        .exclude_tags
        .iter()
        .filter_map(|t| clean_tag_name(t))
        .collect();

    let mut conditions: Vec<String> = vec![FILE_OBJECT_FILTER.to_string()];

    match (filters.tag_logic, include.len()) {
        (_, 0) => {}
        (TagLogic::And, _) => {
            for tag in &include {
                conditions.push(tag_predicate(tag, false));
            }
        }
        (TagLogic::Or, 1) => conditions.push(tag_predicate(&include[0], false)),
        (TagLogic::Or, _) => {
            let group: Vec<String> = include.iter().map(|t| tag_predicate(t, false)).collect();
            conditions.push(format!("({})", group.join(" OR ")));
        }
    }

    for tag in &exclude {
        conditions.push(tag_predicate(tag, true));
    }

    for filter in additional_filters {
        let trimmed = filter.trim();
        if !trimmed.is_empty() {
            conditions.push(trimmed.to_string());
        }
    }

    let mut query = format!(
        "SELECT {} FROM STORE('/') WHERE {}",
        TAG_SEARCH_FIELDS,
        conditions.join(" AND ")
    );
    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {}", limit));
    }
    query
}
