//! Query options carried alongside the AQL text.
//!
//! The Data Suite query endpoint takes two parameters: `select` (the query
//! text, passed as-is; the HTTP layer performs the only URL encoding) and
//! `options`, a small JSON blob controlling format, streaming, and
//! validate-only semantics.

use serde::{Deserialize, Serialize};

/// Response format requested from the query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryFormat {
    #[default]
    Json,
    Csv,
}

impl QueryFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for QueryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QueryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Invalid query format: {}", s)),
        }
    }
}

/// Side-channel options for one query call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub format: QueryFormat,
    pub stream: bool,
    pub validate: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            format: QueryFormat::Json,
            stream: false,
            validate: false,
        }
    }
}

impl QueryOptions {
    /// Options for a full execution in the given format.
    pub fn execute(format: QueryFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// Options for a syntax-check-only call.
    pub fn validate_only() -> Self {
        Self {
            validate: true,
            ..Default::default()
        }
    }

    /// Canonical sorted-key JSON rendering.
    ///
    /// Used both as the wire parameter and as cache-key input, so it must be
    /// deterministic across equivalent option orderings. The keys are emitted
    /// in alphabetical order: `format`, `stream`, `validate`.
    pub fn canonical_json(&self) -> String {
        format!(
            r#"{{"format":"{}","stream":{},"validate":{}}}"#,
            self.format, self.stream, self.validate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_json_is_sorted_and_stable() {
        let options = QueryOptions::execute(QueryFormat::Json);
        assert_eq!(
            options.canonical_json(),
            r#"{"format":"json","stream":false,"validate":false}"#
        );
        assert_eq!(options.canonical_json(), options.canonical_json());
    }

    #[test]
    fn test_validate_only_options() {
        let options = QueryOptions::validate_only();
        assert!(options.validate);
        assert!(!options.stream);
        assert_eq!(options.format, QueryFormat::Json);
        assert_eq!(
            options.canonical_json(),
            r#"{"format":"json","stream":false,"validate":true}"#
        );
    }

    #[test]
    fn test_csv_format_round_trip() {
        let format: QueryFormat = "CSV".parse().unwrap();
        assert_eq!(format, QueryFormat::Csv);
        assert_eq!(format.as_str(), "csv");
        assert!("parquet".parse::<QueryFormat>().is_err());
    }
}
