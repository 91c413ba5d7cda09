//! # aparavi-client
//!
//! HTTP client for the Aparavi Data Suite query and tagging API.
//!
//! This crate provides:
//! - [`AparaviClient`]: authenticated access to the query endpoint with
//!   retry/backoff and read-through result caching
//! - Dual-channel error interpretation: transport failures are typed
//!   errors, remote-reported query errors are data
//! - Tag-definition management and file tagging, including tenant-id
//!   auto-discovery
//! - Best-effort SELECT-clause rewriting for file-object extraction
//!
//! # Example
//!
//! ```rust,no_run
//! use aparavi_client::AparaviClient;
//! use aparavi_core::{AparaviConfig, QueryFormat};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AparaviConfig::from_env();
//!     let client = AparaviClient::new(config).unwrap();
//!     let reply = client
//!         .execute("SELECT name FROM STORE('/') WHERE ClassID = 'idxobject' LIMIT 5",
//!                  QueryFormat::Json, true, false)
//!         .await
//!         .unwrap();
//!     println!("{:?}", reply);
//! }
//! ```

pub mod client;
pub mod retry;
pub mod select;
pub mod tagging;

pub use client::{
    AparaviClient, HealthStatus, QueryReply, DISCOVERY_QUERY, HEALTH_CHECK_QUERY,
};
pub use retry::RetryPolicy;
pub use select::ensure_fields_selected;
pub use tagging::{FileTagAction, TagDefinitionAction};
