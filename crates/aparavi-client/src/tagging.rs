//! Tag-definition management and file tagging.
//!
//! Both endpoint families are scoped to one tenant: definition management
//! requires the client object id on every call, so it is resolved (or
//! discovered) before anything goes on the wire.

use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, info};

use aparavi_core::{
    normalize_tag_names, remote_status, Error, FileObject, QueryFormat, RemoteStatus, Result,
    RowSet,
};

use crate::client::{AparaviClient, QueryReply};
use crate::select::ensure_fields_selected;

/// Fields every tagging query must return.
const TAGGING_FIELDS: &[&str] = &["objectId", "instanceId"];

/// Operations on the tag-definition catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDefinitionAction {
    Create,
    List,
    Delete,
}

impl std::str::FromStr for TagDefinitionAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "list" => Ok(Self::List),
            "delete" => Ok(Self::Delete),
            other => Err(Error::InvalidInput(format!(
                "Unknown tag definition action: {}",
                other
            ))),
        }
    }
}

/// Operations on file tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTagAction {
    Apply,
    Remove,
}

impl std::str::FromStr for FileTagAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "apply" => Ok(Self::Apply),
            "remove" => Ok(Self::Remove),
            other => Err(Error::InvalidInput(format!(
                "Unknown file tag action: {}",
                other
            ))),
        }
    }
}

impl AparaviClient {
    async fn tag_response(&self, response: reqwest::Response, context: &str) -> Result<Value> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)));
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(Error::Auth),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            other => Err(Error::Request(format!(
                "{} failed with status {}: {}",
                context, other, text
            ))),
        }
    }

    /// Create, list, or delete tag definitions for this tenant.
    ///
    /// `names` is ignored for `List`. Create/delete batches are normalized
    /// first; a batch with no surviving valid name is an error, never a
    /// silent no-op.
    pub async fn manage_tag_definitions(
        &self,
        action: TagDefinitionAction,
        names: &[String],
    ) -> Result<Value> {
        let client_object_id = self.ensure_client_object_id().await?;
        let endpoint = self.config().tag_definitions_endpoint();

        match action {
            TagDefinitionAction::List => {
                debug!("listing tag definitions");
                let response = self
                    .http()
                    .get(&endpoint)
                    .query(&[("clientObjectId", client_object_id.as_str())])
                    .send()
                    .await?;
                self.tag_response(response, "List tag definitions").await
            }
            TagDefinitionAction::Create | TagDefinitionAction::Delete => {
                let tags = normalize_tag_names(names);
                if tags.is_empty() {
                    return Err(Error::InvalidInput(
                        "no valid tag names after cleaning - tag definitions require at least one non-empty name"
                            .to_string(),
                    ));
                }

                let payload = json!({
                    "clientObjectId": client_object_id,
                    "tagDefinitions": tags,
                });

                let request = match action {
                    TagDefinitionAction::Create => self.http().post(&endpoint),
                    _ => self.http().delete(&endpoint),
                };

                info!(count = tags.len(), ?action, "managing tag definitions");
                let response = request.json(&payload).send().await?;
                self.tag_response(response, "Manage tag definitions").await
            }
        }
    }

    /// Apply or remove tags on a batch of file objects.
    ///
    /// Both collections are validated first: malformed object rows and
    /// empty tag names are dropped, and an operation whose collections
    /// empty out fails with a descriptive error.
    pub async fn manage_file_tags(
        &self,
        action: FileTagAction,
        objects: &[Value],
        tag_names: &[String],
    ) -> Result<Value> {
        let file_objects = FileObject::from_rows(objects);
        if file_objects.is_empty() {
            return Err(Error::InvalidInput(
                "no valid file objects - each entry needs an objectId and an instanceId"
                    .to_string(),
            ));
        }

        let tags = normalize_tag_names(tag_names);
        if tags.is_empty() {
            return Err(Error::InvalidInput(
                "no valid tag names after cleaning - tagging requires at least one non-empty name"
                    .to_string(),
            ));
        }

        let payload = json!({
            "objects": file_objects,
            "tags": tags,
        });

        let endpoint = self.config().tags_endpoint();
        let request = match action {
            FileTagAction::Apply => self.http().post(&endpoint),
            FileTagAction::Remove => self.http().delete(&endpoint),
        };

        info!(
            objects = file_objects.len(),
            tags = tags.len(),
            ?action,
            "managing file tags"
        );
        let response = request.json(&payload).send().await?;
        self.tag_response(response, "Manage file tags").await
    }

    /// Run an AQL query and extract the file objects from its rows.
    ///
    /// The SELECT clause is rewritten to include `objectId` and
    /// `instanceId` when missing; rows that cannot be coerced are skipped
    /// silently.
    pub async fn extract_file_objects_from_aql(&self, query: &str) -> Result<Vec<FileObject>> {
        let rewritten = ensure_fields_selected(query, TAGGING_FIELDS);
        if rewritten != query {
            debug!(original = %query, rewritten = %rewritten, "added tagging fields to SELECT clause");
        }

        let reply = self
            .execute(&rewritten, QueryFormat::Json, false, false)
            .await?;
        let body = match reply {
            QueryReply::Json(body) => body,
            QueryReply::Csv(_) => return Ok(Vec::new()),
        };

        if let RemoteStatus::Error(message) = remote_status(&body) {
            return Err(Error::InvalidInput(format!(
                "file selection query failed: {}",
                message
            )));
        }

        let objects = FileObject::from_rows(RowSet::decode(&body).rows());
        debug!(count = objects.len(), "extracted file objects");
        Ok(objects)
    }
}
