//! Concept detection over free-text business questions.
//!
//! Deliberately naive: lower-case the question, count trigger-substring
//! hits per concept, drop concepts with zero hits. No stemming, no
//! tokenization. Overlapping triggers are additive: a question can score
//! above 1 for a concept and that is fine, because scores only drive
//! template-selection branching and are never compared numerically by
//! callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Analytical intents the template builder knows how to express.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    Duplicates,
    FileSize,
    TimeRecent,
    TimeOld,
    DataSource,
    FileType,
    Classification,
}

impl Concept {
    /// All concepts in stable template order.
    pub const ALL: [Concept; 7] = [
        Concept::Duplicates,
        Concept::FileSize,
        Concept::TimeRecent,
        Concept::TimeOld,
        Concept::DataSource,
        Concept::FileType,
        Concept::Classification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicates => "duplicates",
            Self::FileSize => "file_size",
            Self::TimeRecent => "time_recent",
            Self::TimeOld => "time_old",
            Self::DataSource => "data_source",
            Self::FileType => "file_type",
            Self::Classification => "classification",
        }
    }
}

impl std::fmt::Display for Concept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected concepts with their match scores. Absence of a key means the
/// concept was not detected.
pub type ConceptSet = BTreeMap<Concept, usize>;

/// Trigger substrings per concept.
const TRIGGERS: &[(Concept, &[&str])] = &[
    (
        Concept::Duplicates,
        &["duplicate", "copies", "redundant", "waste", "dedup"],
    ),
    (
        Concept::FileSize,
        &["large", "biggest", "size", "storage", "space", "consuming"],
    ),
    (
        Concept::TimeRecent,
        &["recent", "created", "last", "new", "modified"],
    ),
    (
        Concept::TimeOld,
        &["old", "stale", "unused", "accessed", "year", "archive"],
    ),
    (
        Concept::DataSource,
        &["department", "source", "location", "across", "server", "share"],
    ),
    (
        Concept::FileType,
        &["type", "extension", "format", "pdf", "document"],
    ),
    (
        Concept::Classification,
        &["sensitive", "classif", "pii", "confidential", "compliance"],
    ),
];

/// Detect analytical concepts in a business question.
pub fn detect_concepts(question: &str) -> ConceptSet {
    let lowered = question.to_lowercase();
    let mut detected = ConceptSet::new();

    for (concept, triggers) in TRIGGERS {
        let score = triggers
            .iter()
            .filter(|trigger| lowered.contains(*trigger))
            .count();
        if score > 0 {
            detected.insert(*concept, score);
        }
    }

    detected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_pdf_question_scores_size_and_recency() {
        let detected = detect_concepts("Find large PDF files created in the last 30 days");
        assert!(detected.get(&Concept::FileSize).copied().unwrap_or(0) > 0);
        // "created" and "last" both hit, so the score is additive.
        assert!(detected.get(&Concept::TimeRecent).copied().unwrap_or(0) >= 2);
        assert!(detected.contains_key(&Concept::FileType));
    }

    #[test]
    fn test_duplicate_waste_question() {
        let detected = detect_concepts("Show me storage waste from duplicate files by department");
        assert!(detected.contains_key(&Concept::Duplicates));
        assert!(detected.contains_key(&Concept::FileSize));
        assert!(detected.contains_key(&Concept::DataSource));
    }

    #[test]
    fn test_stale_data_question() {
        let detected =
            detect_concepts("Find old unused files that haven't been accessed in over a year");
        assert!(detected.get(&Concept::TimeOld).copied().unwrap_or(0) >= 3);
    }

    #[test]
    fn test_classification_question() {
        let detected = detect_concepts("Analyze sensitive data distribution across data sources");
        assert!(detected.contains_key(&Concept::Classification));
        assert!(detected.contains_key(&Concept::DataSource));
    }

    #[test]
    fn test_zero_match_concepts_are_omitted() {
        let detected = detect_concepts("hello");
        assert!(detected.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let detected = detect_concepts("DUPLICATE FILES");
        assert!(detected.contains_key(&Concept::Duplicates));
    }
}
