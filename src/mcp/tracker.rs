//! Purpose-built tracker tools.
//!
//! These know the shape of projects, issues, statuses and comments, but every
//! remote call still goes through [`DocumentBridge`]. Multi-step tools run
//! their calls strictly in order and do not roll back on partial failure.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::bridge::{Attachment, DocumentBridge};
use super::envelope::{to_json, ToolError};
use super::types::*;
use crate::models::rank::next_rank;
use crate::models::{
    format_date, from_document, Comment, Issue, IssuePriority, IssueStatus, Project, ProjectGroup,
};
use crate::platform::{generate_id, Document, FindOptions};

pub const ISSUE: &str = "tracker.class.Issue";
pub const PROJECT: &str = "tracker.class.Project";
pub const ISSUE_STATUS: &str = "tracker.class.IssueStatus";
pub const COMPONENT: &str = "tracker.class.Component";
pub const MILESTONE: &str = "tracker.class.Milestone";
pub const COMMENT: &str = "chunter.class.ChatMessage";
pub const NO_PARENT: &str = "tracker.ids.NoParent";
const PROJECT_SPACE: &str = "core.space.Space";

const SUB_ISSUES: &str = "subIssues";
const COMMENTS: &str = "comments";
const DESCRIPTION: &str = "description";
const DEFAULT_ISSUE_LIMIT: u32 = 50;

/// Build a query or attribute map from a JSON object literal.
fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

fn parse_priority(s: &str) -> Result<IssuePriority, ToolError> {
    IssuePriority::from_str(s).ok_or_else(|| {
        ToolError::invalid(format!(
            "Invalid priority '{}'. Must be: no-priority, urgent, high, medium, or low",
            s
        ))
    })
}

fn priority_name(n: i64) -> &'static str {
    IssuePriority::from_number(n)
        .map(|p| p.as_str())
        .unwrap_or("unknown")
}

// ============================================================
// Lookups
// ============================================================

pub async fn find_project(
    bridge: &DocumentBridge,
    identifier: &str,
) -> Result<Option<Project>, ToolError> {
    let found = bridge
        .find_one(
            PROJECT,
            &doc(json!({ "identifier": identifier })),
            &FindOptions::default(),
        )
        .await?;
    Ok(found.map(from_document).transpose()?)
}

async fn require_project(bridge: &DocumentBridge, identifier: &str) -> Result<Project, ToolError> {
    find_project(bridge, identifier)
        .await?
        .ok_or_else(|| ToolError::invalid(format!("Project not found: {}", identifier)))
}

pub async fn find_issue(
    bridge: &DocumentBridge,
    identifier: &str,
) -> Result<Option<Issue>, ToolError> {
    let found = bridge
        .find_one(
            ISSUE,
            &doc(json!({ "identifier": identifier })),
            &FindOptions::default(),
        )
        .await?;
    Ok(found.map(from_document).transpose()?)
}

async fn require_issue(bridge: &DocumentBridge, identifier: &str) -> Result<Issue, ToolError> {
    find_issue(bridge, identifier)
        .await?
        .ok_or_else(|| ToolError::invalid(format!("Issue not found: {}", identifier)))
}

async fn load_statuses(bridge: &DocumentBridge) -> Result<Vec<IssueStatus>, ToolError> {
    let docs = bridge
        .find_all(ISSUE_STATUS, &Document::new(), &FindOptions::default())
        .await?;
    Ok(docs
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<IssueStatus>, _>>()?)
}

fn status_by_name<'a>(statuses: &'a [IssueStatus], name: &str) -> Result<&'a IssueStatus, ToolError> {
    statuses
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| {
            let names: Vec<&str> = statuses.iter().map(|s| s.name.as_str()).collect();
            ToolError::invalid(format!(
                "Unknown status '{}'. Available: {}",
                name,
                names.join(", ")
            ))
        })
}

fn status_names(statuses: &[IssueStatus]) -> HashMap<&str, &str> {
    statuses
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect()
}

/// The new sequence value from an `$inc` update with `retrieve`.
fn sequence_from(result: &Value) -> Option<u64> {
    result
        .get("object")
        .and_then(|o| o.get("sequence"))
        .or_else(|| result.get("sequence"))
        .and_then(Value::as_u64)
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(
    bridge: &DocumentBridge,
    req: ListProjectsRequest,
) -> Result<String, ToolError> {
    let docs = bridge
        .find_all(PROJECT, &Document::new(), &FindOptions::default().sort_by("name", false))
        .await?;
    let projects: Vec<Project> = docs
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<Project>, _>>()?
        .into_iter()
        .filter(|p| req.include_archived || !p.archived)
        .collect();

    if projects.is_empty() {
        return Ok("No projects found".to_string());
    }

    let mut out = format!("Found {} project(s):", projects.len());
    for project in &projects {
        out.push_str(&format!("\n{}: {}", project.identifier, project.name));
        if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!(" ({})", description));
        }
        if project.archived {
            out.push_str(" [archived]");
        }
    }
    Ok(out)
}

pub async fn get_project(bridge: &DocumentBridge, req: ProjectRequest) -> Result<String, ToolError> {
    let project = require_project(bridge, &req.project).await?;
    to_json(&project)
}

async fn list_groups(
    bridge: &DocumentBridge,
    class: &str,
    project: &str,
    label: &str,
) -> Result<String, ToolError> {
    let project = require_project(bridge, project).await?;
    let docs = bridge
        .find_all(
            class,
            &doc(json!({ "space": project.id })),
            &FindOptions::default(),
        )
        .await?;
    let groups = docs
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<ProjectGroup>, _>>()?;

    if groups.is_empty() {
        return Ok(format!("No {} in {}", label, project.identifier));
    }

    let mut out = format!("Found {} {} in {}:", groups.len(), label, project.identifier);
    for group in &groups {
        out.push_str(&format!("\n- {}", group.name));
        if let Some(date) = group.target_date {
            out.push_str(&format!(" (target {})", format_date(date)));
        }
    }
    Ok(out)
}

pub async fn list_components(
    bridge: &DocumentBridge,
    req: ProjectRequest,
) -> Result<String, ToolError> {
    list_groups(bridge, COMPONENT, &req.project, "component(s)").await
}

pub async fn list_milestones(
    bridge: &DocumentBridge,
    req: ProjectRequest,
) -> Result<String, ToolError> {
    list_groups(bridge, MILESTONE, &req.project, "milestone(s)").await
}

// ============================================================
// Issues
// ============================================================

pub async fn list_statuses(bridge: &DocumentBridge) -> Result<String, ToolError> {
    let statuses = load_statuses(bridge).await?;
    if statuses.is_empty() {
        return Ok("No issue statuses defined".to_string());
    }
    let names: Vec<&str> = statuses.iter().map(|s| s.name.as_str()).collect();
    Ok(format!("Issue statuses:\n{}", names.join("\n")))
}

pub async fn list_issues(
    bridge: &DocumentBridge,
    req: ListIssuesRequest,
) -> Result<String, ToolError> {
    let priority = req.priority.as_deref().map(parse_priority).transpose()?;

    let mut query = Document::new();
    if let Some(identifier) = &req.project {
        let project = require_project(bridge, identifier).await?;
        query.insert("space".into(), Value::String(project.id));
    }

    let statuses = load_statuses(bridge).await?;
    if let Some(name) = &req.status {
        let status = status_by_name(&statuses, name)?;
        query.insert("status".into(), Value::String(status.id.clone()));
    }
    if let Some(priority) = priority {
        query.insert("priority".into(), json!(priority.as_number()));
    }

    let options = FindOptions::default()
        .sort_by("modifiedOn", true)
        .limit(req.limit.unwrap_or(DEFAULT_ISSUE_LIMIT));
    let issues = bridge
        .find_all(ISSUE, &query, &options)
        .await?
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<Issue>, _>>()?;

    if issues.is_empty() {
        return Ok("No issues found".to_string());
    }

    let names = status_names(&statuses);
    let mut out = format!("Found {} issue(s):", issues.len());
    for issue in &issues {
        let status = issue
            .status
            .as_deref()
            .and_then(|id| names.get(id).copied())
            .unwrap_or("unknown");
        out.push_str(&format!(
            "\n{}: {} [{}, {}]",
            issue.identifier,
            issue.title,
            status,
            priority_name(issue.priority)
        ));
    }
    Ok(out)
}

pub async fn get_issue(bridge: &DocumentBridge, req: IssueRequest) -> Result<String, ToolError> {
    let issue = require_issue(bridge, &req.issue).await?;

    let description = match issue.description.as_deref().filter(|d| !d.is_empty()) {
        Some(markup) => Some(
            bridge
                .fetch_markup(ISSUE, &issue.id, DESCRIPTION, markup)
                .await?,
        ),
        None => None,
    };

    let statuses = load_statuses(bridge).await?;
    let names = status_names(&statuses);
    let status = issue
        .status
        .as_deref()
        .and_then(|id| names.get(id).copied())
        .unwrap_or("unknown");

    let mut out = format!("{}: {}", issue.identifier, issue.title);
    out.push_str(&format!("\nStatus: {}", status));
    out.push_str(&format!("\nPriority: {}", priority_name(issue.priority)));
    out.push_str(&format!(
        "\nAssignee: {}",
        issue.assignee.as_deref().unwrap_or("Unassigned")
    ));
    if let Some(due) = issue.due_date {
        out.push_str(&format!("\nDue: {}", format_date(due)));
    }
    if issue.estimation > 0.0 {
        out.push_str(&format!("\nEstimation: {}h", issue.estimation));
    }
    if let Some(text) = description {
        out.push_str(&format!("\n\nDescription:\n{}", text));
    }
    Ok(out)
}

pub async fn create_issue(
    bridge: &DocumentBridge,
    req: CreateIssueRequest,
) -> Result<String, ToolError> {
    let priority = req
        .priority
        .as_deref()
        .map(parse_priority)
        .transpose()?
        .unwrap_or(IssuePriority::NoPriority);

    let project = require_project(bridge, &req.project).await?;

    let project_space = match &project.space {
        Some(space) => space.clone(),
        None => bridge.resolve(PROJECT_SPACE)?.to_string(),
    };
    let incremented = bridge
        .update_doc(
            PROJECT,
            &project_space,
            &project.id,
            &doc(json!({ "$inc": { "sequence": 1 } })),
            true,
        )
        .await?;
    let number = sequence_from(&incremented).unwrap_or(project.sequence + 1);
    let identifier = format!("{}-{}", project.identifier, number);

    let last = bridge
        .find_one(
            ISSUE,
            &doc(json!({ "space": project.id })),
            &FindOptions::default().sort_by("rank", true).limit(1),
        )
        .await?;
    let last_rank = last
        .as_ref()
        .and_then(|d| d.get("rank"))
        .and_then(Value::as_str);
    let rank = next_rank(last_rank);

    let issue_id = generate_id();
    let description = match req.description.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(text) => Some(
            bridge
                .upload_markup(ISSUE, &issue_id, DESCRIPTION, text)
                .await?,
        ),
        None => None,
    };

    let no_parent = bridge.resolve(NO_PARENT)?;
    let attributes = doc(json!({
        "title": req.title,
        "description": description,
        "status": project.default_issue_status,
        "number": number,
        "identifier": identifier,
        "priority": priority.as_number(),
        "rank": rank,
        "assignee": null,
        "component": null,
        "milestone": null,
        "dueDate": req.due_date,
        "estimation": req.estimation.unwrap_or(0.0),
        "remainingTime": req.estimation.unwrap_or(0.0),
        "reportedTime": 0,
        "reports": 0,
        "subIssues": 0,
        "comments": 0,
        "parents": [],
        "childInfo": []
    }));

    let slot = Attachment {
        class: ISSUE,
        space: &project.id,
        attached_to: no_parent.as_str(),
        parent_class: ISSUE,
        collection: SUB_ISSUES,
    };
    let id = bridge.add_collection(slot, &attributes, Some(issue_id)).await?;

    tracing::info!(identifier = %identifier, "Created issue");
    Ok(format!("Created issue {}: {} (ID: {})", identifier, req.title, id))
}

pub async fn update_issue(
    bridge: &DocumentBridge,
    req: UpdateIssueRequest,
) -> Result<String, ToolError> {
    let priority = req.priority.as_deref().map(parse_priority).transpose()?;
    let description = req.description.as_deref().filter(|d| !d.trim().is_empty());
    if req.title.is_none()
        && description.is_none()
        && priority.is_none()
        && req.due_date.is_none()
        && req.estimation.is_none()
    {
        return Err(ToolError::invalid("No fields to update"));
    }

    let issue = require_issue(bridge, &req.issue).await?;

    let mut operations = Document::new();
    if let Some(title) = &req.title {
        operations.insert("title".into(), json!(title));
    }
    if let Some(text) = description {
        let markup = bridge
            .upload_markup(ISSUE, &issue.id, DESCRIPTION, text)
            .await?;
        operations.insert(DESCRIPTION.into(), json!(markup));
    }
    if let Some(priority) = priority {
        operations.insert("priority".into(), json!(priority.as_number()));
    }
    if let Some(due) = req.due_date {
        operations.insert("dueDate".into(), json!(due));
    }
    if let Some(estimation) = req.estimation {
        operations.insert("estimation".into(), json!(estimation));
    }

    bridge
        .update_doc(ISSUE, &issue.space, &issue.id, &operations, false)
        .await?;

    let fields: Vec<&str> = operations.keys().map(String::as_str).collect();
    Ok(format!(
        "Updated issue {} ({})",
        issue.identifier,
        fields.join(", ")
    ))
}

/// Moves an issue to another status. Transition rules are not checked.
pub async fn change_issue_status(
    bridge: &DocumentBridge,
    req: ChangeIssueStatusRequest,
) -> Result<String, ToolError> {
    let issue = require_issue(bridge, &req.issue).await?;
    let statuses = load_statuses(bridge).await?;
    let status = status_by_name(&statuses, &req.status)?;

    bridge
        .update_doc(
            ISSUE,
            &issue.space,
            &issue.id,
            &doc(json!({ "status": status.id })),
            false,
        )
        .await?;

    Ok(format!(
        "Changed status of {} to {}",
        issue.identifier, status.name
    ))
}

pub async fn delete_issue(bridge: &DocumentBridge, req: IssueRequest) -> Result<String, ToolError> {
    let issue = require_issue(bridge, &req.issue).await?;
    let no_parent = bridge.resolve(NO_PARENT)?;

    let slot = Attachment {
        class: ISSUE,
        space: &issue.space,
        attached_to: issue.attached_to.as_deref().unwrap_or(no_parent.as_str()),
        parent_class: ISSUE,
        collection: issue.collection.as_deref().unwrap_or(SUB_ISSUES),
    };
    bridge.remove_collection(slot, &issue.id).await?;

    Ok(format!("Deleted issue {}", issue.identifier))
}

// ============================================================
// Comments
// ============================================================

pub async fn add_comment(
    bridge: &DocumentBridge,
    req: AddCommentRequest,
) -> Result<String, ToolError> {
    if req.message.trim().is_empty() {
        return Err(ToolError::invalid("Comment message is empty"));
    }

    let issue = require_issue(bridge, &req.issue).await?;
    let slot = Attachment {
        class: COMMENT,
        space: &issue.space,
        attached_to: &issue.id,
        parent_class: ISSUE,
        collection: COMMENTS,
    };
    let id = bridge
        .add_collection(slot, &doc(json!({ "message": req.message })), None)
        .await?;

    Ok(format!("Added comment to {} (ID: {})", issue.identifier, id))
}

pub async fn list_comments(
    bridge: &DocumentBridge,
    req: IssueRequest,
) -> Result<String, ToolError> {
    let issue = require_issue(bridge, &req.issue).await?;
    let comments = bridge
        .find_all(
            COMMENT,
            &doc(json!({ "attachedTo": issue.id })),
            &FindOptions::default().sort_by("createdOn", false),
        )
        .await?
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<Comment>, _>>()?;

    if comments.is_empty() {
        return Ok(format!("No comments on {}", issue.identifier));
    }

    let mut out = format!("{} comment(s) on {}:", comments.len(), issue.identifier);
    for comment in &comments {
        let when = comment
            .created_on
            .map(format_date)
            .unwrap_or_else(|| "unknown date".to_string());
        out.push_str(&format!("\n[{}] {}", when, comment.message));
    }
    Ok(out)
}
