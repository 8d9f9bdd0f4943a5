//! Typed views of platform records used by the tracker tools.
//!
//! The generic document tools never use these: they pass records through as
//! opaque JSON. The purpose-built tracker tools project the few fields they
//! need into these types.
//!
//! - [`Project`]: the space that owns issues; carries the issue sequence.
//! - [`Issue`]: an attached document in a project's `subIssues` collection.
//! - [`IssueStatus`], [`IssuePriority`]: workflow state and urgency.
//! - [`Comment`]: a chat message attached to an issue.

mod issue;
mod project;
pub mod rank;

pub use issue::*;
pub use project::*;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::platform::Document;

/// Project a remote record into a typed view.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(doc))
}

/// Format epoch milliseconds as a calendar date.
pub fn format_date(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| millis.to_string())
}
