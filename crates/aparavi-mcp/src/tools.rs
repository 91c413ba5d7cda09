//! MCP tools for the Aparavi gateway.
//!
//! Thin dispatch layer: every tool validates its loosely-typed argument
//! map, calls into `aparavi-client`/`aparavi-query`, and shapes the result
//! into a `{content, isError}` envelope. Remote-reported query errors are
//! rendered as error text for the caller, never panicked or dropped.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use aparavi_client::{AparaviClient, FileTagAction, HealthStatus, QueryReply, TagDefinitionAction};
use aparavi_core::{remote_status, validate_fields, QueryFormat, RemoteStatus};
use aparavi_query::{
    build_query, build_tag_search_query, detect_concepts, Complexity, TagLogic, TagSearchFilters,
};

/// Aparavi gateway MCP service.
#[derive(Clone)]
pub struct AparaviService {
    client: Arc<AparaviClient>,
    tool_router: ToolRouter<Self>,
}

impl AparaviService {
    pub fn new(client: Arc<AparaviClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    fn text_result(text: impl Into<String>) -> CallToolResult {
        CallToolResult::success(vec![Content::text(text.into())])
    }

    fn error_result(text: impl Into<String>) -> CallToolResult {
        CallToolResult::error(vec![Content::text(text.into())])
    }

    /// Shape one query reply for display: pretty JSON, or the raw CSV text.
    fn render_reply(reply: &QueryReply) -> CallToolResult {
        match reply {
            QueryReply::Json(body) => match remote_status(body) {
                RemoteStatus::Error(message) => Self::error_result(format!("AQL Error: {}", message)),
                _ => Self::text_result(
                    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()),
                ),
            },
            QueryReply::Csv(text) => Self::text_result(text.clone()),
        }
    }
}

#[tool_handler]
impl ServerHandler for AparaviService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Aparavi gateway: run and validate AQL queries against a data catalog, \
                 generate AQL from business questions, and manage file tags. Use \
                 'health_check' first to verify connectivity, 'generate_aql_query' to turn \
                 a question into AQL, and 'run_aql_query' to execute it."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Input Schemas
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RunQueryRequest {
    /// AQL query text to execute
    #[schemars(description = "AQL query text to execute")]
    pub query: String,

    /// Response format: "json" (default) or "csv"
    #[schemars(description = "Response format: json or csv")]
    pub format: Option<String>,

    /// Whether the result cache may serve this call (default: true)
    #[schemars(description = "Serve from the result cache when possible")]
    pub use_cache: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ValidateQueryRequest {
    /// AQL query text to syntax-check without executing
    #[schemars(description = "AQL query text to syntax-check without executing")]
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateQueryRequest {
    /// The business question to translate into AQL
    #[schemars(description = "Business question, e.g. 'Find large PDF files created recently'")]
    pub business_question: String,

    /// Output fields the caller wants; validated against the field registry
    #[schemars(description = "Desired output fields (validated, aliases auto-corrected)")]
    pub desired_fields: Option<Vec<String>>,

    /// Free-text filter hints, e.g. "PDF files", "large files"
    #[schemars(description = "Free-text filter hints")]
    pub filters: Option<Vec<String>>,

    /// "simple" (LIMIT 50, default) or "comprehensive" (no limit)
    #[schemars(description = "Complexity preference: simple or comprehensive")]
    pub complexity_preference: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ManageTagDefinitionsRequest {
    /// One of "create", "list", "delete"
    #[schemars(description = "Action: create, list, or delete")]
    pub action: String,

    /// Tag names for create/delete; ignored for list
    #[schemars(description = "Tag names for create/delete")]
    pub tag_names: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FileTagsRequest {
    /// AQL query selecting the files to operate on
    #[schemars(description = "AQL query selecting the files (objectId/instanceId added automatically)")]
    pub aql_query: String,

    /// Tags to apply or remove
    #[schemars(description = "Tag names")]
    pub tag_names: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchByTagRequest {
    /// Files must carry these tags
    #[schemars(description = "Tags the files must carry")]
    pub include_tags: Option<Vec<String>>,

    /// Files must not carry these tags
    #[schemars(description = "Tags the files must not carry")]
    pub exclude_tags: Option<Vec<String>>,

    /// "OR" (default) or "AND" combination of include tags
    #[schemars(description = "Include-tag combination: OR or AND")]
    pub tag_logic: Option<String>,

    /// Extra AQL conditions AND-joined into the WHERE clause
    #[schemars(description = "Extra AQL conditions")]
    pub additional_filters: Option<Vec<String>>,

    /// Maximum rows to return
    #[schemars(description = "Maximum rows to return")]
    pub limit: Option<u32>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl AparaviService {
    /// Connectivity probe
    #[tool(description = "Check connectivity to the Aparavi Data Suite API by running a one-row canary query.")]
    pub async fn health_check(&self) -> Result<CallToolResult, McpError> {
        match self.client.health_check().await {
            HealthStatus::Passed(_) => Ok(Self::text_result(
                "Aparavi gateway is healthy and the API executed a test query successfully",
            )),
            HealthStatus::QueryError(message) => Ok(Self::error_result(format!(
                "Aparavi API is reachable but the test query failed: {}",
                message
            ))),
            HealthStatus::Unreachable(message) => Ok(Self::error_result(format!(
                "Aparavi API is not reachable: {}",
                message
            ))),
        }
    }

    /// Configuration snapshot
    #[tool(description = "Report the gateway configuration: host, port, API version, cache settings.")]
    pub async fn server_info(&self) -> Result<CallToolResult, McpError> {
        let config = self.client.config();
        let info = format!(
            "Aparavi gateway configuration:\n\
             - Host: {}\n\
             - Port: {}\n\
             - API version: {}\n\
             - Query endpoint: {}\n\
             - Cache enabled: {}\n\
             - Cache TTL: {}s\n\
             - Cached entries: {}\n\
             - Max retries: {}",
            config.host,
            config.port,
            config.api_version,
            config.query_endpoint(),
            config.cache_enabled,
            config.cache_ttl_seconds,
            self.client.cache_size().await,
            config.max_retries,
        );
        Ok(Self::text_result(info))
    }

    /// Execute AQL
    #[tool(description = "Execute an AQL query against the data catalog and return the results.")]
    pub async fn run_aql_query(
        &self,
        Parameters(request): Parameters<RunQueryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let format = match request.format.as_deref() {
            None => QueryFormat::Json,
            Some(raw) => match raw.parse() {
                Ok(format) => format,
                Err(e) => return Ok(Self::error_result(e)),
            },
        };
        let use_cache = request.use_cache.unwrap_or(true);

        match self
            .client
            .execute(&request.query, format, use_cache, false)
            .await
        {
            Ok(reply) => Ok(Self::render_reply(&reply)),
            Err(e) => Ok(Self::error_result(format!("Query execution failed: {}", e))),
        }
    }

    /// Validate AQL
    #[tool(description = "Syntax-check an AQL query without executing it.")]
    pub async fn validate_aql_query(
        &self,
        Parameters(request): Parameters<ValidateQueryRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .client
            .execute(&request.query, QueryFormat::Json, false, true)
            .await
        {
            Ok(QueryReply::Json(body)) => match remote_status(&body) {
                RemoteStatus::Error(message) => {
                    Ok(Self::error_result(format!("Query is invalid: {}", message)))
                }
                _ => Ok(Self::text_result("Query is valid")),
            },
            Ok(QueryReply::Csv(_)) => Ok(Self::text_result("Query is valid")),
            Err(e) => Ok(Self::error_result(format!("Validation failed: {}", e))),
        }
    }

    /// Natural language to AQL
    #[tool(description = "Generate an AQL query from a business question using concept detection and clause templates.")]
    pub async fn generate_aql_query(
        &self,
        Parameters(request): Parameters<GenerateQueryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let complexity = match request.complexity_preference.as_deref() {
            None => Complexity::Simple,
            Some(raw) => match raw.parse() {
                Ok(complexity) => complexity,
                Err(e) => return Ok(Self::error_result(e)),
            },
        };

        let concepts = detect_concepts(&request.business_question);
        info!(
            question = %request.business_question,
            concepts = concepts.len(),
            "generating AQL query"
        );

        let filters = request.filters.unwrap_or_default();
        let generated = build_query(&concepts, &filters, &request.business_question, complexity);

        let mut sections = Vec::new();
        sections.push(format!("## Generated AQL Query\n\n{}", generated.query));
        sections.push(format!(
            "## Query Explanation\n\n{}",
            generated
                .explanation(&concepts)
                .iter()
                .map(|line| format!("- {}", line))
                .collect::<Vec<_>>()
                .join("\n")
        ));

        if let Some(desired) = &request.desired_fields {
            let validation = validate_fields(desired);
            let mut lines = Vec::new();
            if !validation.valid.is_empty() {
                lines.push(format!("Valid fields: {}", validation.valid.join(", ")));
            }
            for corrected in &validation.corrected {
                lines.push(format!(
                    "Corrected '{}' to '{}'",
                    corrected.requested, corrected.canonical
                ));
            }
            for invalid in &validation.invalid {
                if invalid.suggestions.is_empty() {
                    lines.push(format!("Invalid field '{}' (no close matches)", invalid.name));
                } else {
                    lines.push(format!(
                        "Invalid field '{}' - did you mean: {}?",
                        invalid.name,
                        invalid.suggestions.join(", ")
                    ));
                }
            }
            sections.push(format!("## Field Validation\n\n{}", lines.join("\n")));
        }

        // Best-effort remote syntax check; generation still succeeds when
        // the API is down.
        let validation_note = if self.client.validate(&generated.query).await {
            "The query passed remote syntax validation."
        } else {
            "Remote syntax validation was unavailable; run validate_aql_query before executing."
        };
        sections.push(format!(
            "## Important Notes\n\n- {}\n- Generated queries follow the restricted AQL clause set (no DISTINCT, no DATEADD).",
            validation_note
        ));
        sections.push(
            "## Next Steps\n\n1. Review the query above.\n2. Execute it with run_aql_query.\n3. Refine filters or complexity and regenerate if needed."
                .to_string(),
        );

        Ok(Self::text_result(sections.join("\n\n")))
    }

    /// Tag-definition catalog
    #[tool(description = "Create, list, or delete tag definitions for this tenant.")]
    pub async fn manage_tag_definitions(
        &self,
        Parameters(request): Parameters<ManageTagDefinitionsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let action: TagDefinitionAction = match request.action.parse() {
            Ok(action) => action,
            Err(e) => return Ok(Self::error_result(e.to_string())),
        };
        let names = request.tag_names.unwrap_or_default();

        match self.client.manage_tag_definitions(action, &names).await {
            Ok(result) => Ok(Self::text_result(
                serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string()),
            )),
            Err(e) => Ok(Self::error_result(e.to_string())),
        }
    }

    /// Apply tags
    #[tool(description = "Apply tags to every file matched by an AQL query.")]
    pub async fn tag_files(
        &self,
        Parameters(request): Parameters<FileTagsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.apply_or_remove(FileTagAction::Apply, request).await
    }

    /// Remove tags
    #[tool(description = "Remove tags from every file matched by an AQL query.")]
    pub async fn untag_files(
        &self,
        Parameters(request): Parameters<FileTagsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.apply_or_remove(FileTagAction::Remove, request).await
    }

    /// Tag search
    #[tool(description = "Find files by tag membership, with OR/AND include logic and exclusions.")]
    pub async fn search_files_by_tag(
        &self,
        Parameters(request): Parameters<SearchByTagRequest>,
    ) -> Result<CallToolResult, McpError> {
        let tag_logic = match request.tag_logic.as_deref() {
            None => TagLogic::Or,
            Some(raw) => match raw.parse() {
                Ok(logic) => logic,
                Err(e) => return Ok(Self::error_result(e)),
            },
        };

        let filters = TagSearchFilters {
            include_tags: request.include_tags.unwrap_or_default(),
            exclude_tags: request.exclude_tags.unwrap_or_default(),
            tag_logic,
        };
        let additional = request.additional_filters.unwrap_or_default();
        let query = build_tag_search_query(&filters, &additional, request.limit);

        match self
            .client
            .execute(&query, QueryFormat::Json, true, false)
            .await
        {
            Ok(reply) => Ok(Self::render_reply(&reply)),
            Err(e) => Ok(Self::error_result(format!("Tag search failed: {}", e))),
        }
    }

    /// Cache reset
    #[tool(description = "Clear the query result cache.")]
    pub async fn clear_cache(&self) -> Result<CallToolResult, McpError> {
        let size = self.client.cache_size().await;
        self.client.clear_cache().await;
        Ok(Self::text_result(format!(
            "Query cache cleared ({} entries dropped)",
            size
        )))
    }
}

impl AparaviService {
    async fn apply_or_remove(
        &self,
        action: FileTagAction,
        request: FileTagsRequest,
    ) -> Result<CallToolResult, McpError> {
        let objects = match self
            .client
            .extract_file_objects_from_aql(&request.aql_query)
            .await
        {
            Ok(objects) => objects,
            Err(e) => return Ok(Self::error_result(e.to_string())),
        };

        if objects.is_empty() {
            return Ok(Self::error_result(
                "The query matched no taggable files (rows need objectId and instanceId)",
            ));
        }

        let rows: Vec<Value> = objects
            .iter()
            .filter_map(|object| serde_json::to_value(object).ok())
            .collect();

        match self
            .client
            .manage_file_tags(action, &rows, &request.tag_names)
            .await
        {
            Ok(_) => Ok(Self::text_result(format!(
                "{} {} tag(s) on {} file(s)",
                match action {
                    FileTagAction::Apply => "Applied",
                    FileTagAction::Remove => "Removed",
                },
                request.tag_names.len(),
                objects.len()
            ))),
            Err(e) => Ok(Self::error_result(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_reply_surfaces_remote_errors() {
        let reply = QueryReply::Json(json!({"status": "error", "message": "bad column"}));
        let result = AparaviService::render_reply(&reply);
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn test_render_reply_passes_ok_bodies_through() {
        let reply = QueryReply::Json(json!({"status": "OK", "data": {"objects": []}}));
        let result = AparaviService::render_reply(&reply);
        assert_ne!(result.is_error, Some(true));
    }

    #[test]
    fn test_render_reply_returns_csv_verbatim() {
        let reply = QueryReply::Csv("name,size\n".to_string());
        let result = AparaviService::render_reply(&reply);
        assert_ne!(result.is_error, Some(true));
    }
}
