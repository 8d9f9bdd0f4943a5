//! Uniform success/failure payloads for tool calls.
//!
//! Tool bodies produce `Result<String, ToolError>`; [`respond`] turns either
//! side into a `CallToolResult`, so no failure ever reaches the transport as
//! a protocol error.

use rmcp::model::{CallToolResult, Content};
use thiserror::Error;

use crate::platform::{ConnectionError, RemoteError};
use crate::registry::ResolveError;

/// Everything that can go wrong inside a tool body.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A remote-call primitive rejected the request.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Input that only a purpose-built tool can judge (unknown project, ...).
    #[error("{0}")]
    Invalid(String),

    /// A record or response did not have the expected JSON shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Wrap a tool outcome. `action` is a gerund phrase such as
/// `"finding document"`.
pub fn respond(action: &str, outcome: Result<String, ToolError>) -> CallToolResult {
    match outcome {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => {
            let message = failure_message(action, &e);
            tracing::warn!(action, error = %e, "Tool call failed");
            CallToolResult::error(vec![Content::text(message)])
        }
    }
}

pub fn failure_message(action: &str, error: &ToolError) -> String {
    format!("Error {}: {}", action, error)
}

/// Pretty JSON for embedding in a text block.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ToolError> {
    Ok(serde_json::to_string_pretty(value)?)
}
