//! # aparavi-query
//!
//! Natural-language concept detection and templated AQL assembly.
//!
//! The pipeline is deliberately deterministic: a business question is
//! pattern-matched into a [`concepts::ConceptSet`], which selects clause
//! fragments from fixed tables in [`builder`]. Nothing here talks to the
//! network; generated queries are validated and executed through
//! `aparavi-client`.

pub mod builder;
pub mod concepts;
pub mod tag_search;

pub use builder::{
    build_query, Complexity, GeneratedQuery, FILE_OBJECT_FILTER, SIMPLE_ROW_LIMIT,
};
pub use concepts::{detect_concepts, Concept, ConceptSet};
pub use tag_search::{build_tag_search_query, TagLogic, TagSearchFilters};
