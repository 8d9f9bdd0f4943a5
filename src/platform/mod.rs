//! Outbound contract with the remote document platform.
//!
//! The gateway never models the platform's data itself. It talks to a
//! [`PlatformClient`] session obtained from a [`Connector`], passing queries
//! and attribute maps through as opaque JSON objects.

pub mod connection;
pub mod http;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::registry::ClassRef;

pub use connection::{Connection, ConnectionError, ConnectionStatus};
pub use http::{HttpConnector, HttpPlatformClient};

/// A remote record, query, or attribute/operation map.
pub type Document = serde_json::Map<String, Value>;

/// A live session with the platform.
pub type Session = Arc<dyn PlatformClient>;

/// Errors reported by a remote-call primitive.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: token or credentials rejected")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Session is closed")]
    Closed,

    /// Anything else the platform rejected, carried verbatim.
    #[error("{0}")]
    Rejected(String),
}

/// Options accepted by `find_one` / `find_all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FindOptions {
    #[schemars(description = "Maximum number of documents to return")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[schemars(description = "Sort order: field name to 1 (ascending) or -1 (descending)")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<BTreeMap<String, i32>>,
    /// Any other option understood by the platform (projection, lookup, ...).
    #[serde(flatten)]
    pub extra: Document,
}

impl FindOptions {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort_by(mut self, field: &str, descending: bool) -> Self {
        self.sort
            .get_or_insert_with(BTreeMap::new)
            .insert(field.to_string(), if descending { -1 } else { 1 });
        self
    }
}

/// Text format used when uploading or fetching rich-text markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupFormat {
    #[default]
    Markdown,
    Html,
}

impl MarkupFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }
}

/// How a session authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Password { email: String, password: String },
}

/// Everything the connect primitive needs.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub url: String,
    pub workspace: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

/// The remote document store, as seen by the gateway.
///
/// Identifiers are passed through opaquely; their shape belongs to the
/// platform. A `space` is either a well-known space reference or the id of a
/// space document such as a project.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn find_one(
        &self,
        class: &ClassRef,
        query: &Document,
        options: &FindOptions,
    ) -> Result<Option<Document>, RemoteError>;

    async fn find_all(
        &self,
        class: &ClassRef,
        query: &Document,
        options: &FindOptions,
    ) -> Result<Vec<Document>, RemoteError>;

    /// Create a document and return its id.
    async fn create_doc(
        &self,
        class: &ClassRef,
        space: &str,
        attributes: &Document,
        id: &str,
    ) -> Result<String, RemoteError>;

    /// Apply an operation map. With `retrieve`, the platform returns the
    /// updated state (for `$inc` operations, the new values).
    async fn update_doc(
        &self,
        class: &ClassRef,
        space: &str,
        id: &str,
        operations: &Document,
        retrieve: bool,
    ) -> Result<Value, RemoteError>;

    async fn remove_doc(&self, class: &ClassRef, space: &str, id: &str) -> Result<(), RemoteError>;

    async fn add_collection(&self, item: &CollectionItem, attributes: &Document)
        -> Result<String, RemoteError>;

    async fn update_collection(
        &self,
        item: &CollectionItem,
        operations: &Document,
        retrieve: bool,
    ) -> Result<Value, RemoteError>;

    async fn remove_collection(&self, item: &CollectionItem) -> Result<(), RemoteError>;

    async fn create_mixin(&self, target: &MixinTarget, attributes: &Document)
        -> Result<(), RemoteError>;

    async fn update_mixin(&self, target: &MixinTarget, attributes: &Document)
        -> Result<(), RemoteError>;

    /// Store rich text for `attribute` of a document; returns the markup ref.
    async fn upload_markup(
        &self,
        class: &ClassRef,
        id: &str,
        attribute: &str,
        text: &str,
        format: MarkupFormat,
    ) -> Result<String, RemoteError>;

    async fn fetch_markup(
        &self,
        class: &ClassRef,
        id: &str,
        attribute: &str,
        markup: &str,
        format: MarkupFormat,
    ) -> Result<String, RemoteError>;

    /// Lightweight introspection of the authenticated account.
    async fn account(&self) -> Result<Value, RemoteError>;

    async fn close(&self) -> Result<(), RemoteError>;
}

/// The remote connect primitive.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, options: &ConnectOptions) -> Result<Session, RemoteError>;
}

/// Addresses one attached sub-document in a parent's collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    pub class: ClassRef,
    pub space: String,
    #[serde(rename = "objectId")]
    pub id: String,
    pub attached_to: String,
    pub attached_to_class: ClassRef,
    pub collection: String,
}

/// Addresses a mixin on an existing document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixinTarget {
    pub object_id: String,
    pub object_class: ClassRef,
    pub object_space: String,
    pub mixin: ClassRef,
}

/// A fresh identifier for a new document.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
