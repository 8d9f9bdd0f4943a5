//! Generic document bridge.
//!
//! Every operation resolves caller-supplied class paths through the
//! namespace registry, obtains the session from the shared connection, and
//! issues exactly one remote call. Purpose-built tools compose these
//! operations instead of touching the session themselves.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::envelope::ToolError;
use crate::platform::{
    generate_id, CollectionItem, Connection, Document, FindOptions, MarkupFormat, MixinTarget,
    Session,
};
use crate::registry::{ClassRef, NamespaceRegistry};

/// A sub-document slot: `collection` of `attached_to` (a `parent_class`).
#[derive(Debug, Clone, Copy)]
pub struct Attachment<'a> {
    pub class: &'a str,
    pub space: &'a str,
    pub attached_to: &'a str,
    pub parent_class: &'a str,
    pub collection: &'a str,
}

/// The document a mixin is applied to.
#[derive(Debug, Clone, Copy)]
pub struct MixinOn<'a> {
    pub object_id: &'a str,
    pub object_class: &'a str,
    pub object_space: &'a str,
    pub mixin: &'a str,
}

#[derive(Clone)]
pub struct DocumentBridge {
    connection: Arc<Connection>,
    registry: &'static NamespaceRegistry,
}

impl DocumentBridge {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self::with_registry(connection, NamespaceRegistry::builtin())
    }

    pub fn with_registry(connection: Arc<Connection>, registry: &'static NamespaceRegistry) -> Self {
        Self {
            connection,
            registry,
        }
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn registry(&self) -> &'static NamespaceRegistry {
        self.registry
    }

    pub fn resolve(&self, path: &str) -> Result<ClassRef, ToolError> {
        Ok(self.registry.resolve(path)?)
    }

    async fn session(&self) -> Result<Session, ToolError> {
        Ok(self.connection.connect().await?)
    }

    pub async fn find_one(
        &self,
        class: &str,
        query: &Document,
        options: &FindOptions,
    ) -> Result<Option<Document>, ToolError> {
        let class = self.resolve(class)?;
        let session = self.session().await?;
        tracing::debug!(%class, "find_one");
        Ok(session.find_one(&class, query, options).await?)
    }

    pub async fn find_all(
        &self,
        class: &str,
        query: &Document,
        options: &FindOptions,
    ) -> Result<Vec<Document>, ToolError> {
        let class = self.resolve(class)?;
        let session = self.session().await?;
        tracing::debug!(%class, "find_all");
        Ok(session.find_all(&class, query, options).await?)
    }

    /// Create a document; `id` defaults to a freshly generated one.
    pub async fn create_doc(
        &self,
        class: &str,
        space: &str,
        attributes: &Document,
        id: Option<String>,
    ) -> Result<String, ToolError> {
        let class = self.resolve(class)?;
        let session = self.session().await?;
        let id = id.unwrap_or_else(generate_id);
        tracing::debug!(%class, space, id = %id, "create_doc");
        Ok(session.create_doc(&class, space, attributes, &id).await?)
    }

    pub async fn update_doc(
        &self,
        class: &str,
        space: &str,
        id: &str,
        operations: &Document,
        retrieve: bool,
    ) -> Result<Value, ToolError> {
        let class = self.resolve(class)?;
        let session = self.session().await?;
        tracing::debug!(%class, space, id, "update_doc");
        Ok(session
            .update_doc(&class, space, id, operations, retrieve)
            .await?)
    }

    pub async fn remove_doc(&self, class: &str, space: &str, id: &str) -> Result<(), ToolError> {
        let class = self.resolve(class)?;
        let session = self.session().await?;
        tracing::debug!(%class, space, id, "remove_doc");
        Ok(session.remove_doc(&class, space, id).await?)
    }

    pub async fn add_collection(
        &self,
        slot: Attachment<'_>,
        attributes: &Document,
        id: Option<String>,
    ) -> Result<String, ToolError> {
        let item = self.collection_item(slot, id.unwrap_or_else(generate_id))?;
        let session = self.session().await?;
        tracing::debug!(class = %item.class, collection = %item.collection, "add_collection");
        Ok(session.add_collection(&item, attributes).await?)
    }

    pub async fn update_collection(
        &self,
        slot: Attachment<'_>,
        id: &str,
        operations: &Document,
        retrieve: bool,
    ) -> Result<Value, ToolError> {
        let item = self.collection_item(slot, id.to_string())?;
        let session = self.session().await?;
        tracing::debug!(class = %item.class, id, "update_collection");
        Ok(session.update_collection(&item, operations, retrieve).await?)
    }

    pub async fn remove_collection(&self, slot: Attachment<'_>, id: &str) -> Result<(), ToolError> {
        let item = self.collection_item(slot, id.to_string())?;
        let session = self.session().await?;
        tracing::debug!(class = %item.class, id, "remove_collection");
        Ok(session.remove_collection(&item).await?)
    }

    pub async fn create_mixin(
        &self,
        on: MixinOn<'_>,
        attributes: &Document,
    ) -> Result<(), ToolError> {
        let target = self.mixin_target(on)?;
        let session = self.session().await?;
        tracing::debug!(mixin = %target.mixin, id = %target.object_id, "create_mixin");
        Ok(session.create_mixin(&target, attributes).await?)
    }

    pub async fn update_mixin(
        &self,
        on: MixinOn<'_>,
        attributes: &Document,
    ) -> Result<(), ToolError> {
        let target = self.mixin_target(on)?;
        let session = self.session().await?;
        tracing::debug!(mixin = %target.mixin, id = %target.object_id, "update_mixin");
        Ok(session.update_mixin(&target, attributes).await?)
    }

    /// Store markdown for a rich-text attribute and return the markup ref.
    pub async fn upload_markup(
        &self,
        class: &str,
        id: &str,
        attribute: &str,
        text: &str,
    ) -> Result<String, ToolError> {
        let class = self.resolve(class)?;
        let session = self.session().await?;
        Ok(session
            .upload_markup(&class, id, attribute, text, MarkupFormat::Markdown)
            .await?)
    }

    pub async fn fetch_markup(
        &self,
        class: &str,
        id: &str,
        attribute: &str,
        markup: &str,
    ) -> Result<String, ToolError> {
        let class = self.resolve(class)?;
        let session = self.session().await?;
        Ok(session
            .fetch_markup(&class, id, attribute, markup, MarkupFormat::Markdown)
            .await?)
    }

    /// Connect if needed, then probe liveness.
    pub async fn ping(&self, timeout: Duration) -> Result<bool, ToolError> {
        self.session().await?;
        Ok(self.connection.ping(timeout).await)
    }

    fn collection_item(&self, slot: Attachment<'_>, id: String) -> Result<CollectionItem, ToolError> {
        Ok(CollectionItem {
            class: self.resolve(slot.class)?,
            space: slot.space.to_string(),
            id,
            attached_to: slot.attached_to.to_string(),
            attached_to_class: self.resolve(slot.parent_class)?,
            collection: slot.collection.to_string(),
        })
    }

    fn mixin_target(&self, on: MixinOn<'_>) -> Result<MixinTarget, ToolError> {
        Ok(MixinTarget {
            object_id: on.object_id.to_string(),
            object_class: self.resolve(on.object_class)?,
            object_space: on.object_space.to_string(),
            mixin: self.resolve(on.mixin)?,
        })
    }
}
