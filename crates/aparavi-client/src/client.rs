//! Client for the Aparavi Data Suite query API.
//!
//! One client owns one HTTP session (Basic-auth headers installed once),
//! the result cache, and the retry schedule for the query endpoint.
//!
//! The API reports failure on two channels: transport status codes, and a
//! `status: "error"` field inside 200-status bodies. The second channel is
//! how syntax errors in the query dialect surface, so [`AparaviClient::execute`]
//! returns such bodies as ordinary data and callers render them to the
//! user instead of unwinding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use aparavi_core::{
    cache_key, remote_status, AparaviConfig, Error, QueryCache, QueryFormat, QueryOptions,
    RemoteStatus, Result, RowSet,
};

use crate::retry::RetryPolicy;

/// Canary query for connectivity checks. Runs a real one-row query so a
/// passing check proves both reachability and query execution.
pub const HEALTH_CHECK_QUERY: &str =
    "SELECT name FROM STORE('/') WHERE ClassID = 'idxobject' LIMIT 1";

/// Discovery query for the tenant (client object) id and node name.
pub const DISCOVERY_QUERY: &str =
    "SELECT node, nodeObjectId WHERE nodeObjectID IS NOT NULL LIMIT 1";

/// A successful reply from the query endpoint.
///
/// `Json` may still carry a remote-reported error in its `status` field;
/// use [`aparavi_core::remote_status`] to inspect it.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryReply {
    Json(Value),
    Csv(String),
}

impl QueryReply {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Csv(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Csv(_) => None,
        }
    }
}

/// Outcome of a health check.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    /// API reachable and the canary query executed.
    Passed(Value),
    /// API reachable but it reported a query-level error.
    QueryError(String),
    /// API not reachable (transport failure or HTTP error status).
    Unreachable(String),
}

enum Attempt {
    Done(QueryReply),
    Transient(String),
}

/// Client for one Data Suite instance.
pub struct AparaviClient {
    http: reqwest::Client,
    config: AparaviConfig,
    retry: RetryPolicy,
    cache: RwLock<QueryCache>,
    discovered_tenant: RwLock<Option<String>>,
}

impl AparaviClient {
    /// Create a client with the default retry schedule from the config.
    pub fn new(config: AparaviConfig) -> Result<Self> {
        let retry = RetryPolicy::new(config.max_retries);
        Self::with_retry_policy(config, retry)
    }

    /// Create a client with an explicit retry policy (fault-injection tests
    /// pass a zero base delay).
    pub fn with_retry_policy(config: AparaviConfig, retry: RetryPolicy) -> Result<Self> {
        let credentials = format!("{}:{}", config.username, config.password);
        let auth_value = format!("Basic {}", BASE64.encode(credentials.as_bytes()));

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| Error::Config(format!("Invalid credentials: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            host = %config.host,
            port = config.port,
            api_version = %config.api_version,
            "Aparavi client session initialized"
        );

        let cache = QueryCache::new(config.cache_ttl_seconds);

        Ok(Self {
            http,
            config,
            retry,
            cache: RwLock::new(cache),
            discovered_tenant: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &AparaviConfig {
        &self.config
    }

    /// One GET against the query endpoint. The query text goes through
    /// un-pre-encoded: `reqwest`'s query-pair encoding is the single
    /// encoding layer, so pre-encoding here would double-encode.
    async fn query_request(
        &self,
        query: &str,
        options: &QueryOptions,
    ) -> reqwest::Result<reqwest::Response> {
        let options_json = options.canonical_json();
        self.http
            .get(self.config.query_endpoint())
            .query(&[("select", query), ("options", options_json.as_str())])
            .send()
            .await
    }

    async fn attempt_execute(
        &self,
        query: &str,
        options: &QueryOptions,
        cache_slot: Option<&str>,
    ) -> Result<Attempt> {
        let response = match self.query_request(query, options).await {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Transient(e.to_string())),
        };

        let status = response.status();
        match status {
            StatusCode::OK => {
                let text = match response.text().await {
                    Ok(text) => text,
                    Err(e) => return Ok(Attempt::Transient(e.to_string())),
                };
                match options.format {
                    QueryFormat::Csv => {
                        if let Some(key) = cache_slot {
                            self.cache
                                .write()
                                .await
                                .set(key, Value::String(text.clone()), None);
                        }
                        Ok(Attempt::Done(QueryReply::Csv(text)))
                    }
                    QueryFormat::Json => {
                        let body: Value = serde_json::from_str(&text)?;
                        match remote_status(&body) {
                            RemoteStatus::Ok => {
                                if let Some(key) = cache_slot {
                                    self.cache.write().await.set(key, body.clone(), None);
                                }
                            }
                            RemoteStatus::Error(ref message) => {
                                debug!(%message, "query reported a data-level error");
                            }
                            RemoteStatus::Unknown => {}
                        }
                        Ok(Attempt::Done(QueryReply::Json(body)))
                    }
                }
            }
            StatusCode::UNAUTHORIZED => Err(Error::Auth),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::BadRequest(body))
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            other => {
                let body = response.text().await.unwrap_or_default();
                Ok(Attempt::Transient(format!(
                    "API request failed with status {}: {}",
                    other, body
                )))
            }
        }
    }

    /// Execute an AQL query.
    ///
    /// With `use_cache` (and caching enabled in config), non-validate calls
    /// are memoized: at most one network call is issued per cache key while
    /// the entry lives. Validate-only calls never touch the cache.
    ///
    /// 401/400/404 are terminal. Other failures retry on the configured
    /// exponential-backoff schedule before surfacing a transport error.
    pub async fn execute(
        &self,
        query: &str,
        format: QueryFormat,
        use_cache: bool,
        validate_only: bool,
    ) -> Result<QueryReply> {
        let options = QueryOptions {
            format,
            stream: false,
            validate: validate_only,
        };

        let cache_slot = (use_cache && !validate_only && self.config.cache_enabled)
            .then(|| cache_key(query, &options));

        if let Some(key) = &cache_slot {
            if let Some(cached) = self.cache.write().await.get(key) {
                debug!("returning cached query result");
                let reply = match (format, cached) {
                    (QueryFormat::Csv, Value::String(text)) => QueryReply::Csv(text),
                    (_, value) => QueryReply::Json(value),
                };
                return Ok(reply);
            }
        }

        info!(query = %query.chars().take(100).collect::<String>(), validate_only, "executing AQL query");

        let mut attempt: u32 = 0;
        loop {
            match self
                .attempt_execute(query, &options, cache_slot.as_deref())
                .await?
            {
                Attempt::Done(reply) => return Ok(reply),
                Attempt::Transient(message) => {
                    if attempt >= self.retry.max_retries {
                        return Err(Error::Transport {
                            attempts: self.retry.max_retries,
                            message,
                        });
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        %message,
                        "query request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Syntax-check a query without executing it.
    ///
    /// A bare boolean probe: one request, no retries, no body inspection.
    /// Use `execute(..., validate_only = true)` when the error message
    /// matters.
    pub async fn validate(&self, query: &str) -> bool {
        let options = QueryOptions::validate_only();
        match self.query_request(query, &options).await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                error!(error = %e, "query validation failed");
                false
            }
        }
    }

    /// Probe connectivity with the canary query.
    pub async fn health_check(&self) -> HealthStatus {
        let options = QueryOptions::execute(QueryFormat::Json);
        let response = match self.query_request(HEALTH_CHECK_QUERY, &options).await {
            Ok(response) => response,
            Err(e) => return HealthStatus::Unreachable(e.to_string()),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return HealthStatus::Unreachable(format!("HTTP error {}", status));
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<Value>(&text) {
            Ok(body) => match remote_status(&body) {
                RemoteStatus::Error(message) => {
                    warn!(%message, "health check reached the API but the query failed");
                    HealthStatus::QueryError(message)
                }
                _ => {
                    info!("health check passed");
                    HealthStatus::Passed(body)
                }
            },
            Err(_) => HealthStatus::QueryError(format!(
                "response received but could not be parsed as JSON: {}",
                text.chars().take(200).collect::<String>()
            )),
        }
    }

    async fn discover_field(&self, field: &str) -> Result<Option<String>> {
        let reply = self
            .execute(DISCOVERY_QUERY, QueryFormat::Json, false, false)
            .await?;
        let Some(body) = reply.into_json() else {
            return Ok(None);
        };
        if let RemoteStatus::Error(message) = remote_status(&body) {
            warn!(%message, field, "discovery query failed");
            return Ok(None);
        }
        let value = RowSet::decode(&body)
            .first()
            .and_then(|row| row.get(field))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.trim().is_empty());
        Ok(value)
    }

    /// Auto-discover the tenant (client object) id. `Ok(None)` when the
    /// discovery query returns no rows.
    pub async fn discover_client_object_id(&self) -> Result<Option<String>> {
        self.discover_field("nodeObjectId").await
    }

    /// Auto-discover the node name backing the base URL. `Ok(None)` when
    /// the discovery query returns no rows.
    pub async fn discover_base_url(&self) -> Result<Option<String>> {
        self.discover_field("node").await
    }

    /// Resolve the tenant id: configured value first, then a memoized
    /// discovery. Fails with a pointer at the manual override when neither
    /// yields anything.
    pub async fn ensure_client_object_id(&self) -> Result<String> {
        if let Some(id) = self.config.client_object_id.as_deref() {
            if !id.trim().is_empty() {
                return Ok(id.to_string());
            }
        }

        if let Some(id) = self.discovered_tenant.read().await.clone() {
            return Ok(id);
        }

        if let Some(id) = self.discover_client_object_id().await? {
            info!(client_object_id = %id, "discovered client object id");
            *self.discovered_tenant.write().await = Some(id.clone());
            return Ok(id);
        }

        Err(Error::Config(
            "Could not determine client object id - set APARAVI_CLIENT_OBJECT_ID manually"
                .to_string(),
        ))
    }

    /// Drop every cached query result.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        info!("query cache cleared");
    }

    /// Number of live cache entries.
    pub async fn cache_size(&self) -> usize {
        self.cache.read().await.len()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}
