//! Read-only resources addressed by `tracker://` URIs.
//!
//! Unlike tools, resource reads fail fast: lookup misses and remote failures
//! are returned as protocol errors for the host to report.

use rmcp::model::{
    AnnotateAble, RawResource, ReadResourceResult, Resource, ResourceContents, ResourceTemplate,
};
use rmcp::ErrorData as McpError;
use serde_json::json;

use super::bridge::DocumentBridge;
use super::envelope::{to_json, ToolError};
use super::tracker::{find_issue, find_project, PROJECT};
use crate::models::{from_document, Project};
use crate::platform::{Document, FindOptions};

pub const SCHEME: &str = "tracker";
pub const PROJECT_TEMPLATE: &str = "tracker://project/{identifier}";
pub const ISSUE_TEMPLATE: &str = "tracker://issue/{identifier}";
const MIME_JSON: &str = "application/json";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    Project(String),
    Issue(String),
}

impl ResourceUri {
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(SCHEME)?.strip_prefix("://")?;
        let (kind, identifier) = rest.split_once('/')?;
        if identifier.is_empty() || identifier.contains('/') {
            return None;
        }
        match kind {
            "project" => Some(Self::Project(identifier.to_string())),
            "issue" => Some(Self::Issue(identifier.to_string())),
            _ => None,
        }
    }

    pub fn project(identifier: &str) -> String {
        format!("{}://project/{}", SCHEME, identifier)
    }
}

fn internal(e: ToolError) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

fn not_found(uri: &str) -> McpError {
    McpError::resource_not_found(
        format!("Resource not found: {}", uri),
        Some(json!({ "uri": uri })),
    )
}

/// Templates for project and issue lookups.
///
/// Built through serde so optional protocol fields keep their defaults.
pub fn templates() -> Result<Vec<ResourceTemplate>, McpError> {
    [
        (PROJECT_TEMPLATE, "project", "A tracker project by identifier, e.g. PROJ"),
        (ISSUE_TEMPLATE, "issue", "A tracker issue by identifier, e.g. PROJ-12"),
    ]
    .into_iter()
    .map(|(uri_template, name, description)| {
        serde_json::from_value(json!({
            "uriTemplate": uri_template,
            "name": name,
            "description": description,
            "mimeType": MIME_JSON
        }))
        .map_err(|e| McpError::internal_error(e.to_string(), None))
    })
    .collect()
}

/// One concrete resource per project.
pub async fn list(bridge: &DocumentBridge) -> Result<Vec<Resource>, McpError> {
    let docs = bridge
        .find_all(PROJECT, &Document::new(), &FindOptions::default().sort_by("name", false))
        .await
        .map_err(internal)?;

    docs.into_iter()
        .map(|doc| {
            let project: Project = from_document(doc).map_err(|e| internal(e.into()))?;
            let mut raw = RawResource::new(ResourceUri::project(&project.identifier), project.name);
            raw.description = project.description;
            raw.mime_type = Some(MIME_JSON.to_string());
            Ok(raw.no_annotation())
        })
        .collect()
}

pub async fn read(bridge: &DocumentBridge, uri: &str) -> Result<ReadResourceResult, McpError> {
    let parsed = ResourceUri::parse(uri).ok_or_else(|| not_found(uri))?;

    let text = match parsed {
        ResourceUri::Project(identifier) => {
            let project = find_project(bridge, &identifier)
                .await
                .map_err(internal)?
                .ok_or_else(|| not_found(uri))?;
            to_json(&project).map_err(internal)?
        }
        ResourceUri::Issue(identifier) => {
            let issue = find_issue(bridge, &identifier)
                .await
                .map_err(internal)?
                .ok_or_else(|| not_found(uri))?;
            to_json(&issue).map_err(internal)?
        }
    };

    let contents: ResourceContents = serde_json::from_value(json!({
        "uri": uri,
        "mimeType": MIME_JSON,
        "text": text
    }))
    .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    Ok(ReadResourceResult {
        contents: vec![contents],
    })
}
