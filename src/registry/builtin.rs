//! Namespaces exposed by the platform's document model.

use super::{NamespaceRegistry, Node};

/// Collects the `kind` groups of one namespace; leaves are `<ns>:<kind>:<Name>`.
struct Namespace {
    name: &'static str,
    kinds: Vec<(String, Node)>,
}

impl Namespace {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            kinds: Vec::new(),
        }
    }

    fn kind(mut self, kind: &str, names: &[&str]) -> Self {
        let namespace = self.name;
        let leaves = names
            .iter()
            .map(|name| (*name, Node::leaf(format!("{}:{}:{}", namespace, kind, name))));
        self.kinds.push((kind.to_string(), Node::group(leaves)));
        self
    }

    fn build(self) -> Node {
        Node::group(self.kinds)
    }
}

pub(super) fn registry() -> NamespaceRegistry {
    NamespaceRegistry::new()
        .with_root(
            "core",
            Namespace::new("core")
                .kind(
                    "class",
                    &[
                        "Doc",
                        "AttachedDoc",
                        "Space",
                        "SystemSpace",
                        "Account",
                        "Status",
                        "StatusCategory",
                        "Class",
                        "Attribute",
                        "TypeString",
                        "TypeNumber",
                        "TypeBoolean",
                        "TypeDate",
                        "TypeMarkup",
                    ],
                )
                .kind("space", &["Model", "Space", "Workspace", "Configuration"])
                .build(),
        )
        .with_root(
            "tracker",
            Namespace::new("tracker")
                .kind(
                    "class",
                    &[
                        "Issue",
                        "Project",
                        "Component",
                        "Milestone",
                        "IssueStatus",
                        "IssueTemplate",
                        "TimeSpendReport",
                        "TypeIssuePriority",
                    ],
                )
                .kind("ids", &["NoParent"])
                .kind("mixin", &["IssueTypeData", "ClassicProjectTypeData"])
                .kind("attribute", &["IssueStatus"])
                .build(),
        )
        .with_root(
            "task",
            Namespace::new("task")
                .kind("class", &["Task", "Project", "ProjectType", "TaskType"])
                .kind("mixin", &["ProjectTypeData", "TaskTypeData"])
                .build(),
        )
        .with_root(
            "contact",
            Namespace::new("contact")
                .kind(
                    "class",
                    &["Contact", "Person", "Organization", "Channel", "PersonAccount"],
                )
                .kind("mixin", &["Employee"])
                .build(),
        )
        .with_root(
            "chunter",
            Namespace::new("chunter")
                .kind(
                    "class",
                    &["ChatMessage", "ThreadMessage", "Channel", "DirectMessage"],
                )
                .kind("space", &["General", "Random"])
                .build(),
        )
        .with_root(
            "tags",
            Namespace::new("tags")
                .kind("class", &["TagElement", "TagReference", "TagCategory"])
                .build(),
        )
        .with_root(
            "attachment",
            Namespace::new("attachment")
                .kind("class", &["Attachment", "Photo"])
                .build(),
        )
}
