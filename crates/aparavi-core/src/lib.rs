//! # aparavi-core
//!
//! Core types and abstractions for the Aparavi gateway.
//!
//! This crate provides:
//! - The error taxonomy shared by every gateway crate
//! - Connection configuration loaded from the environment
//! - Query options and their canonical serialization
//! - The TTL result cache and its content-hash key derivation
//! - Response-envelope decoding (the dual success/error channel)
//! - File-object extraction from result rows
//! - Tag name normalization
//! - The canonical AQL field registry and output-field validation

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod logging;
pub mod objects;
pub mod options;
pub mod tags;

// Re-export commonly used types at crate root
pub use cache::{cache_key, QueryCache};
pub use config::AparaviConfig;
pub use envelope::{remote_status, RemoteStatus, RowSet};
pub use error::{Error, Result};
pub use fields::{
    suggest_fields, validate_fields, CorrectedField, FieldValidation, InvalidField,
    FIELD_ALIASES, FIELD_REGISTRY,
};
pub use logging::init_logging;
pub use objects::FileObject;
pub use options::{QueryFormat, QueryOptions};
pub use tags::{clean_tag_name, normalize_tag_names};
