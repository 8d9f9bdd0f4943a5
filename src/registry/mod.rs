//! Class-path resolution for remote document types.
//!
//! Callers name remote types with dotted paths such as `tracker.class.Issue`.
//! The first segment picks a namespace root, the remaining segments walk the
//! nested groups registered under it until a [`ClassRef`] leaf is reached.
//!
//! The table is built once from static literals (see [`builtin`]) and is never
//! mutated afterwards, so resolution is a pure lookup.

mod builtin;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of dot-separated segments in a class path.
pub const MIN_SEGMENTS: usize = 3;

static BUILTIN: LazyLock<NamespaceRegistry> = LazyLock::new(builtin::registry);

/// Opaque reference to a remote document type, space, or mixin.
///
/// Rendered as `"<namespace>:<kind>:<Name>"`, the form the platform uses for
/// its own identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassRef(String);

impl ClassRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors produced while resolving a class path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Invalid class path '{0}': expected at least module.kind.Name")]
    InvalidPathFormat(String),

    #[error("Unknown module: {0}")]
    UnknownNamespace(String),

    #[error("Class not found: {0}")]
    ClassNotFound(String),
}

/// A node in a namespace tree: either a nested group or a leaf reference.
#[derive(Debug, Clone)]
pub enum Node {
    Group(BTreeMap<String, Node>),
    Ref(ClassRef),
}

impl Node {
    /// Build a group from `(name, node)` pairs.
    pub fn group<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Node)>,
        K: Into<String>,
    {
        Node::Group(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn leaf(id: impl Into<String>) -> Self {
        Node::Ref(ClassRef::new(id))
    }

    fn child(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Group(children) => children.get(name),
            Node::Ref(_) => None,
        }
    }
}

/// Mapping from namespace root names to their reference trees.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    roots: BTreeMap<String, Node>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of platform namespaces known to the gateway.
    pub fn builtin() -> &'static NamespaceRegistry {
        &BUILTIN
    }

    /// Register a namespace root. Registration happens only while building a
    /// registry; a shared registry is never mutated.
    pub fn with_root(mut self, name: impl Into<String>, node: Node) -> Self {
        self.roots.insert(name.into(), node);
        self
    }

    pub fn contains_namespace(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    /// Resolve a dotted path like `tracker.class.Issue` to its [`ClassRef`].
    pub fn resolve(&self, path: &str) -> Result<ClassRef, ResolveError> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.len() < MIN_SEGMENTS {
            return Err(ResolveError::InvalidPathFormat(path.to_string()));
        }

        let namespace = segments[0];
        let mut node = self
            .roots
            .get(namespace)
            .ok_or_else(|| ResolveError::UnknownNamespace(namespace.to_string()))?;

        for segment in &segments[1..] {
            node = node
                .child(segment)
                .ok_or_else(|| ResolveError::ClassNotFound(path.to_string()))?;
        }

        match node {
            Node::Ref(class) => Ok(class.clone()),
            // The path stopped at an intermediate group.
            Node::Group(_) => Err(ResolveError::ClassNotFound(path.to_string())),
        }
    }

    /// Every resolvable path with its reference, in lexical order.
    pub fn paths(&self) -> Vec<(String, ClassRef)> {
        let mut out = Vec::new();
        for (name, node) in &self.roots {
            collect_paths(name, node, &mut out);
        }
        out
    }
}

fn collect_paths(prefix: &str, node: &Node, out: &mut Vec<(String, ClassRef)>) {
    match node {
        Node::Ref(class) => out.push((prefix.to_string(), class.clone())),
        Node::Group(children) => {
            for (name, child) in children {
                collect_paths(&format!("{}.{}", prefix, name), child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> NamespaceRegistry {
        NamespaceRegistry::new().with_root(
            "demo",
            Node::group([
                ("class", Node::group([("Thing", Node::leaf("demo:class:Thing"))])),
                (
                    "nested",
                    Node::group([(
                        "deeper",
                        Node::group([("Leaf", Node::leaf("demo:nested:Leaf"))]),
                    )]),
                ),
            ]),
        )
    }

    #[test]
    fn resolves_three_segment_path() {
        let class = sample().resolve("demo.class.Thing").unwrap();
        assert_eq!(class.as_str(), "demo:class:Thing");
    }

    #[test]
    fn resolves_deeper_paths() {
        let class = sample().resolve("demo.nested.deeper.Leaf").unwrap();
        assert_eq!(class, ClassRef::new("demo:nested:Leaf"));
    }

    #[test]
    fn stopping_at_a_group_is_not_found() {
        let err = sample().resolve("demo.nested.deeper").unwrap_err();
        assert_eq!(err, ResolveError::ClassNotFound("demo.nested.deeper".into()));
    }

    #[test]
    fn descending_past_a_leaf_is_not_found() {
        let err = sample().resolve("demo.class.Thing.extra").unwrap_err();
        assert!(matches!(err, ResolveError::ClassNotFound(_)));
    }

    #[test]
    fn unknown_namespace_names_the_module() {
        let err = sample().resolve("unknown.class.Foo").unwrap_err();
        assert_eq!(err.to_string(), "Unknown module: unknown");
    }

    #[test]
    fn paths_lists_every_leaf() {
        let paths: Vec<String> = sample().paths().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["demo.class.Thing", "demo.nested.deeper.Leaf"]);
    }

    #[test]
    fn every_listed_builtin_path_resolves_to_itself() {
        let registry = NamespaceRegistry::builtin();
        for (path, class) in registry.paths() {
            assert_eq!(registry.resolve(&path).unwrap(), class, "path {}", path);
        }
    }

    proptest! {
        /// Paths with fewer than three segments never resolve.
        #[test]
        fn prop_short_paths_are_invalid(a in "[a-zA-Z]{0,8}", b in "[a-zA-Z]{0,8}", two in any::<bool>()) {
            let path = if two { format!("{}.{}", a, b) } else { a.clone() };
            let err = NamespaceRegistry::builtin().resolve(&path).unwrap_err();
            prop_assert_eq!(err, ResolveError::InvalidPathFormat(path.clone()));
        }
    }
}
