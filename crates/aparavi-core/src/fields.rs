//! Canonical AQL field registry and output-field validation.
//!
//! Callers frequently ask for fields by the names their own tools use
//! (`filename`, `file_size`, ...). Validation accepts registry names as-is,
//! silently maps known aliases to their canonical form, and answers unknown
//! names with fuzzy suggestions instead of failing the whole request.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Similarity cutoff for fuzzy suggestions.
const SUGGESTION_CUTOFF: f64 = 0.6;

/// Maximum number of suggestions per invalid field.
const MAX_SUGGESTIONS: usize = 3;

/// Canonical field name → human-readable description.
pub static FIELD_REGISTRY: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("name", "File name"),
        ("path", "Full file path"),
        ("parentPath", "Parent directory path"),
        ("size", "File size in bytes"),
        ("extension", "File extension"),
        ("createTime", "Creation timestamp"),
        ("modifyTime", "Last modification timestamp"),
        ("accessTime", "Last access timestamp"),
        ("storeTime", "Time the object was indexed"),
        ("classification", "Primary classification label"),
        ("classifications", "All classification hits"),
        ("confidence", "Classification confidence score"),
        ("category", "Document category"),
        ("dupCount", "Number of duplicate instances"),
        ("dupKey", "Duplicate-group key"),
        ("node", "Source node (data source) name"),
        ("nodeObjectId", "Source node object id"),
        ("osOwner", "Operating-system owner"),
        ("osPermission", "Operating-system permissions"),
        ("userTags", "User-applied tags"),
        ("tagTime", "Time tags were last changed"),
        ("objectId", "Object identifier"),
        ("instanceId", "Instance identifier"),
        ("docCreator", "Document creator from metadata"),
        ("docModifier", "Last document modifier from metadata"),
        ("metadata", "Raw document metadata"),
    ])
});

/// Common synonym → canonical field name.
pub static FIELD_ALIASES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("filename", "name"),
        ("file_name", "name"),
        ("filepath", "path"),
        ("file_path", "path"),
        ("folder", "parentPath"),
        ("directory", "parentPath"),
        ("file_size", "size"),
        ("filesize", "size"),
        ("file_type", "extension"),
        ("filetype", "extension"),
        ("type", "extension"),
        ("created", "createTime"),
        ("create_time", "createTime"),
        ("creation_date", "createTime"),
        ("modified", "modifyTime"),
        ("modify_date", "modifyTime"),
        ("last_modified", "modifyTime"),
        ("accessed", "accessTime"),
        ("access_time", "accessTime"),
        ("last_accessed", "accessTime"),
        ("owner", "osOwner"),
        ("permissions", "osPermission"),
        ("tags", "userTags"),
        ("duplicate_count", "dupCount"),
        ("duplicates", "dupCount"),
        ("source", "node"),
        ("data_source", "node"),
        ("server", "node"),
        ("author", "docCreator"),
        ("classification_level", "classification"),
    ])
});

/// An alias that was silently mapped to its canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectedField {
    pub requested: String,
    pub canonical: String,
}

/// A field name that matched neither the registry nor an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidField {
    pub name: String,
    /// Up to three close matches from the canonical + alias vocabulary.
    pub suggestions: Vec<String>,
}

/// Outcome of validating a list of desired output fields.
///
/// Invalid fields never abort the operation; they ride alongside the
/// valid results so the caller can self-correct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// Canonical names accepted for use, in request order.
    pub valid: Vec<String>,
    /// Alias substitutions that were applied.
    pub corrected: Vec<CorrectedField>,
    /// Names that could not be resolved.
    pub invalid: Vec<InvalidField>,
}

/// Fuzzy-match suggestions over the canonical + alias vocabulary.
pub fn suggest_fields(name: &str) -> Vec<String> {
    let needle = name.to_lowercase();
    let mut scored: Vec<(f64, &str)> = FIELD_REGISTRY
        .keys()
        .chain(FIELD_ALIASES.keys())
        .filter_map(|candidate| {
            let score = strsim::jaro_winkler(&needle, &candidate.to_lowercase());
            (score >= SUGGESTION_CUTOFF).then_some((score, *candidate))
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

/// Validate desired output fields against the registry.
pub fn validate_fields(names: &[String]) -> FieldValidation {
    let mut validation = FieldValidation::default();

    for name in names {
        let requested = name.trim();
        if FIELD_REGISTRY.contains_key(requested) {
            validation.valid.push(requested.to_string());
        } else if let Some(canonical) = FIELD_ALIASES.get(requested.to_lowercase().as_str()) {
            validation.valid.push(canonical.to_string());
            validation.corrected.push(CorrectedField {
                requested: requested.to_string(),
                canonical: canonical.to_string(),
            });
        } else {
            validation.invalid.push(InvalidField {
                name: requested.to_string(),
                suggestions: suggest_fields(requested),
            });
        }
    }

    validation
}
