use serde::{Deserialize, Serialize};

/// A tracker project: the space that owns issues, components and milestones.
///
/// Issue identifiers are built from the project's `identifier` and its
/// `sequence` counter, which the platform increments atomically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    /// The space the project document itself lives in.
    #[serde(default)]
    pub space: Option<String>,
    /// Short uppercase key, e.g. `PROJ`.
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Number of the most recently created issue.
    #[serde(default)]
    pub sequence: u64,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub default_issue_status: Option<String>,
}

/// A component or milestone: a named grouping inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGroup {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(alias = "label")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Milestone target date (epoch milliseconds).
    #[serde(default)]
    pub target_date: Option<i64>,
}
