//! Request types for MCP tools and prompts.

use rmcp::schemars::JsonSchema;
use serde::Deserialize;

use crate::platform::{Document, FindOptions};

// ============================================================
// Generic Document Tools
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindRequest {
    #[schemars(description = "Class path of the documents to search, e.g. 'tracker.class.Issue'")]
    pub class: String,
    #[schemars(description = "Query object matched against document fields, e.g. {\"identifier\": \"PROJ-1\"}")]
    #[serde(default)]
    pub query: Document,
    #[schemars(description = "Find options: limit, sort, and any other platform option")]
    #[serde(default)]
    pub options: FindOptions,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateDocRequest {
    #[schemars(description = "Class path of the new document, e.g. 'tracker.class.Component'")]
    pub class: String,
    #[schemars(description = "Space path the document belongs to, e.g. 'core.space.Space'")]
    pub space: String,
    #[schemars(description = "Attributes of the new document")]
    #[serde(default)]
    pub attributes: Document,
    #[schemars(description = "Optional document id. A new id is generated when omitted.")]
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateDocRequest {
    #[schemars(description = "Class path of the document")]
    pub class: String,
    #[schemars(description = "Space path of the document")]
    pub space: String,
    #[schemars(description = "Id of the document to update")]
    pub object_id: String,
    #[schemars(
        description = "Operations to apply: plain field values, or instructions such as {\"$inc\": {\"sequence\": 1}}"
    )]
    pub operations: Document,
    #[schemars(description = "Return the updated values. Defaults to false.")]
    #[serde(default)]
    pub retrieve: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveDocRequest {
    #[schemars(description = "Class path of the document")]
    pub class: String,
    #[schemars(description = "Space path of the document")]
    pub space: String,
    #[schemars(description = "Id of the document to remove")]
    pub object_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddCollectionRequest {
    #[schemars(description = "Class path of the attached document, e.g. 'chunter.class.ChatMessage'")]
    pub class: String,
    #[schemars(description = "Space path of the attached document")]
    pub space: String,
    #[schemars(description = "Id of the parent document")]
    pub attached_to: String,
    #[schemars(description = "Class path of the parent document")]
    pub attached_to_class: String,
    #[schemars(description = "Name of the parent's collection, e.g. 'comments'")]
    pub collection: String,
    #[schemars(description = "Attributes of the attached document")]
    #[serde(default)]
    pub attributes: Document,
    #[schemars(description = "Optional id for the attached document. A new id is generated when omitted.")]
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateCollectionRequest {
    #[schemars(description = "Class path of the attached document")]
    pub class: String,
    #[schemars(description = "Space path of the attached document")]
    pub space: String,
    #[schemars(description = "Id of the attached document")]
    pub object_id: String,
    #[schemars(description = "Id of the parent document")]
    pub attached_to: String,
    #[schemars(description = "Class path of the parent document")]
    pub attached_to_class: String,
    #[schemars(description = "Name of the parent's collection")]
    pub collection: String,
    #[schemars(description = "Operations to apply to the attached document")]
    pub operations: Document,
    #[schemars(description = "Return the updated values. Defaults to false.")]
    #[serde(default)]
    pub retrieve: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveCollectionRequest {
    #[schemars(description = "Class path of the attached document")]
    pub class: String,
    #[schemars(description = "Space path of the attached document")]
    pub space: String,
    #[schemars(description = "Id of the attached document")]
    pub object_id: String,
    #[schemars(description = "Id of the parent document")]
    pub attached_to: String,
    #[schemars(description = "Class path of the parent document")]
    pub attached_to_class: String,
    #[schemars(description = "Name of the parent's collection")]
    pub collection: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MixinRequest {
    #[schemars(description = "Id of the document the mixin applies to")]
    pub object_id: String,
    #[schemars(description = "Class path of that document")]
    pub object_class: String,
    #[schemars(description = "Space path of that document")]
    pub object_space: String,
    #[schemars(description = "Class path of the mixin, e.g. 'contact.mixin.Employee'")]
    pub mixin: String,
    #[schemars(description = "Mixin attributes")]
    #[serde(default)]
    pub attributes: Document,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListClassesRequest {
    #[schemars(description = "Only list classes of this module, e.g. 'tracker'")]
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckConnectionRequest {
    #[schemars(description = "How long to wait for the platform to answer, in milliseconds. Defaults to 5000.")]
    #[serde(default = "default_ping_timeout")]
    pub timeout_ms: u64,
}

fn default_ping_timeout() -> u64 {
    5000
}

// ============================================================
// Tracker Tools
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListProjectsRequest {
    #[schemars(description = "Include archived projects. Defaults to false.")]
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectRequest {
    #[schemars(description = "Project identifier, e.g. 'PROJ'")]
    pub project: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListIssuesRequest {
    #[schemars(description = "Only issues of this project identifier")]
    #[serde(default)]
    pub project: Option<String>,
    #[schemars(description = "Only issues in this status (name, case-insensitive)")]
    #[serde(default)]
    pub status: Option<String>,
    #[schemars(description = "Only issues with this priority: no-priority, urgent, high, medium, low")]
    #[serde(default)]
    pub priority: Option<String>,
    #[schemars(description = "Maximum number of issues to return. Defaults to 50.")]
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IssueRequest {
    #[schemars(description = "Issue identifier, e.g. 'PROJ-12'")]
    pub issue: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateIssueRequest {
    #[schemars(description = "Identifier of the project to create the issue in")]
    pub project: String,
    #[schemars(description = "Issue title")]
    pub title: String,
    #[schemars(description = "Issue description in markdown")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "Priority: no-priority, urgent, high, medium, low. Defaults to no-priority.")]
    #[serde(default)]
    pub priority: Option<String>,
    #[schemars(description = "Due date as epoch milliseconds")]
    #[serde(default)]
    pub due_date: Option<i64>,
    #[schemars(description = "Estimation in hours")]
    #[serde(default)]
    pub estimation: Option<f64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateIssueRequest {
    #[schemars(description = "Issue identifier, e.g. 'PROJ-12'")]
    pub issue: String,
    #[schemars(description = "New title")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "New description in markdown")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "New priority: no-priority, urgent, high, medium, low")]
    #[serde(default)]
    pub priority: Option<String>,
    #[schemars(description = "New due date as epoch milliseconds")]
    #[serde(default)]
    pub due_date: Option<i64>,
    #[schemars(description = "New estimation in hours")]
    #[serde(default)]
    pub estimation: Option<f64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ChangeIssueStatusRequest {
    #[schemars(description = "Issue identifier, e.g. 'PROJ-12'")]
    pub issue: String,
    #[schemars(description = "Target status name, e.g. 'In Progress'")]
    pub status: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddCommentRequest {
    #[schemars(description = "Issue identifier, e.g. 'PROJ-12'")]
    pub issue: String,
    #[schemars(description = "Comment text")]
    pub message: String,
}

// ============================================================
// Prompt Arguments
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BugReportArgs {
    #[schemars(description = "Identifier of the project to file the bug in")]
    pub project: String,
    #[schemars(description = "One-line summary of the bug")]
    pub summary: String,
    #[schemars(description = "Steps to reproduce, if known")]
    #[serde(default)]
    pub steps: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectPromptArgs {
    #[schemars(description = "Project identifier, e.g. 'PROJ'")]
    pub project: String,
}
