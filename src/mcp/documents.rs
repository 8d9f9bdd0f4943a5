//! Generic document tools: thin text renderers over [`DocumentBridge`].

use std::time::Duration;

use super::bridge::{Attachment, DocumentBridge, MixinOn};
use super::envelope::{to_json, ToolError};
use super::types::*;

pub const NOT_FOUND: &str = "No document found matching the criteria";

pub async fn find_one(bridge: &DocumentBridge, req: FindRequest) -> Result<String, ToolError> {
    match bridge.find_one(&req.class, &req.query, &req.options).await? {
        Some(doc) => to_json(&doc),
        None => Ok(NOT_FOUND.to_string()),
    }
}

pub async fn find_all(bridge: &DocumentBridge, req: FindRequest) -> Result<String, ToolError> {
    let docs = bridge.find_all(&req.class, &req.query, &req.options).await?;
    Ok(format!("Found {} document(s)\n{}", docs.len(), to_json(&docs)?))
}

pub async fn create_doc(bridge: &DocumentBridge, req: CreateDocRequest) -> Result<String, ToolError> {
    let space = bridge.resolve(&req.space)?;
    let id = bridge
        .create_doc(&req.class, space.as_str(), &req.attributes, req.id)
        .await?;
    Ok(format!("Document created with ID: {}", id))
}

pub async fn update_doc(bridge: &DocumentBridge, req: UpdateDocRequest) -> Result<String, ToolError> {
    let space = bridge.resolve(&req.space)?;
    let result = bridge
        .update_doc(
            &req.class,
            space.as_str(),
            &req.object_id,
            &req.operations,
            req.retrieve,
        )
        .await?;

    if req.retrieve {
        Ok(format!("Document {} updated\n{}", req.object_id, to_json(&result)?))
    } else {
        Ok(format!("Document {} updated", req.object_id))
    }
}

pub async fn remove_doc(bridge: &DocumentBridge, req: RemoveDocRequest) -> Result<String, ToolError> {
    let space = bridge.resolve(&req.space)?;
    bridge
        .remove_doc(&req.class, space.as_str(), &req.object_id)
        .await?;
    Ok(format!("Document {} removed", req.object_id))
}

pub async fn add_collection(
    bridge: &DocumentBridge,
    req: AddCollectionRequest,
) -> Result<String, ToolError> {
    let space = bridge.resolve(&req.space)?;
    let slot = Attachment {
        class: &req.class,
        space: space.as_str(),
        attached_to: &req.attached_to,
        parent_class: &req.attached_to_class,
        collection: &req.collection,
    };
    let id = bridge.add_collection(slot, &req.attributes, req.id.clone()).await?;
    Ok(format!("Collection item created with ID: {}", id))
}

pub async fn update_collection(
    bridge: &DocumentBridge,
    req: UpdateCollectionRequest,
) -> Result<String, ToolError> {
    let space = bridge.resolve(&req.space)?;
    let slot = Attachment {
        class: &req.class,
        space: space.as_str(),
        attached_to: &req.attached_to,
        parent_class: &req.attached_to_class,
        collection: &req.collection,
    };
    let result = bridge
        .update_collection(slot, &req.object_id, &req.operations, req.retrieve)
        .await?;

    if req.retrieve {
        Ok(format!(
            "Collection item {} updated\n{}",
            req.object_id,
            to_json(&result)?
        ))
    } else {
        Ok(format!("Collection item {} updated", req.object_id))
    }
}

pub async fn remove_collection(
    bridge: &DocumentBridge,
    req: RemoveCollectionRequest,
) -> Result<String, ToolError> {
    let space = bridge.resolve(&req.space)?;
    let slot = Attachment {
        class: &req.class,
        space: space.as_str(),
        attached_to: &req.attached_to,
        parent_class: &req.attached_to_class,
        collection: &req.collection,
    };
    bridge.remove_collection(slot, &req.object_id).await?;
    Ok(format!("Collection item {} removed", req.object_id))
}

fn mixin_on<'a>(req: &'a MixinRequest, space: &'a str) -> MixinOn<'a> {
    MixinOn {
        object_id: &req.object_id,
        object_class: &req.object_class,
        object_space: space,
        mixin: &req.mixin,
    }
}

pub async fn create_mixin(bridge: &DocumentBridge, req: MixinRequest) -> Result<String, ToolError> {
    let space = bridge.resolve(&req.object_space)?;
    bridge
        .create_mixin(mixin_on(&req, space.as_str()), &req.attributes)
        .await?;
    Ok(format!("Mixin {} created on {}", req.mixin, req.object_id))
}

pub async fn update_mixin(bridge: &DocumentBridge, req: MixinRequest) -> Result<String, ToolError> {
    let space = bridge.resolve(&req.object_space)?;
    bridge
        .update_mixin(mixin_on(&req, space.as_str()), &req.attributes)
        .await?;
    Ok(format!("Mixin {} updated on {}", req.mixin, req.object_id))
}

pub fn list_classes(bridge: &DocumentBridge, req: ListClassesRequest) -> Result<String, ToolError> {
    if let Some(ns) = &req.namespace {
        if !bridge.registry().contains_namespace(ns) {
            return Err(ToolError::invalid(format!("Unknown module: {}", ns)));
        }
    }

    let lines: Vec<String> = bridge
        .registry()
        .paths()
        .into_iter()
        .filter(|(path, _)| match &req.namespace {
            Some(ns) => path.split('.').next() == Some(ns.as_str()),
            None => true,
        })
        .map(|(path, class)| format!("{} -> {}", path, class))
        .collect();

    Ok(lines.join("\n"))
}

pub async fn check_connection(
    bridge: &DocumentBridge,
    req: CheckConnectionRequest,
) -> Result<String, ToolError> {
    let alive = bridge.ping(Duration::from_millis(req.timeout_ms)).await?;
    let config = bridge.connection().config();
    if alive {
        Ok(format!(
            "Connected to {} (workspace {})",
            config.url, config.workspace
        ))
    } else {
        Err(ToolError::invalid(format!(
            "Platform did not respond within {} ms",
            req.timeout_ms
        )))
    }
}
