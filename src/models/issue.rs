use serde::{Deserialize, Serialize};

/// An issue in a tracker project.
///
/// Issues are attached documents: top-level issues hang off the
/// `tracker.ids.NoParent` marker in the `subIssues` collection. `description`
/// holds a markup reference, not the text itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: String,
    pub space: String,
    /// Human key such as `PROJ-12`.
    pub identifier: String,
    #[serde(default)]
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub milestone: Option<String>,
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub estimation: f64,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub attached_to: Option<String>,
    #[serde(default)]
    pub attached_to_class: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub modified_on: Option<i64>,
}

/// Issue priority as stored by the platform (0-4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IssuePriority {
    NoPriority,
    Urgent,
    High,
    Medium,
    Low,
}

impl IssuePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPriority => "no-priority",
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no-priority" | "no_priority" | "none" => Some(Self::NoPriority),
            "urgent" => Some(Self::Urgent),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_number(&self) -> i64 {
        match self {
            Self::NoPriority => 0,
            Self::Urgent => 1,
            Self::High => 2,
            Self::Medium => 3,
            Self::Low => 4,
        }
    }

    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            0 => Some(Self::NoPriority),
            1 => Some(Self::Urgent),
            2 => Some(Self::High),
            3 => Some(Self::Medium),
            4 => Some(Self::Low),
            _ => None,
        }
    }
}

/// A workflow status an issue can be in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssueStatus {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// A comment attached to an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_on: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parsing_is_case_insensitive() {
        assert_eq!(IssuePriority::from_str("High"), Some(IssuePriority::High));
        assert_eq!(IssuePriority::from_str("NONE"), Some(IssuePriority::NoPriority));
        assert_eq!(IssuePriority::from_str("critical"), None);
    }

    #[test]
    fn priority_numbers_match_platform_values() {
        for n in 0..=4 {
            let priority = IssuePriority::from_number(n).unwrap();
            assert_eq!(priority.as_number(), n);
        }
        assert_eq!(IssuePriority::Urgent.as_number(), 1);
        assert_eq!(IssuePriority::from_number(9), None);
    }

    #[test]
    fn issue_reads_platform_field_names() {
        let issue: Issue = serde_json::from_value(serde_json::json!({
            "_id": "i1",
            "space": "p1",
            "identifier": "PROJ-3",
            "number": 3,
            "title": "Broken login",
            "dueDate": 1700000000000i64,
            "attachedTo": "tracker:ids:NoParent"
        }))
        .unwrap();

        assert_eq!(issue.identifier, "PROJ-3");
        assert_eq!(issue.due_date, Some(1700000000000));
        assert_eq!(issue.attached_to.as_deref(), Some("tracker:ids:NoParent"));
        assert_eq!(issue.priority, 0);
    }
}
