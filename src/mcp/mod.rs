//! MCP gateway exposing the platform's document API as tools, resources and
//! prompts.

mod bridge;
mod documents;
mod envelope;
mod prompts;
mod resources;
mod tracker;
mod types;

use std::sync::Arc;

pub use bridge::{Attachment, DocumentBridge, MixinOn};
pub use envelope::{failure_message, respond, ToolError};
pub use resources::{ResourceUri, ISSUE_TEMPLATE, PROJECT_TEMPLATE};
pub use types::*;

use axum::Router;
use rmcp::{
    handler::server::{
        router::{prompt::PromptRouter, tool::ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolResult, GetPromptRequestParam, GetPromptResult, ListPromptsResult,
        ListResourceTemplatesResult, ListResourcesResult, PaginatedRequestParam, PromptMessage,
        PromptMessageRole, ReadResourceRequestParam, ReadResourceResult, ServerCapabilities,
        ServerInfo,
    },
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpService,
    },
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::platform::Connection;

#[derive(Clone)]
pub struct GatewayServer {
    bridge: DocumentBridge,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl GatewayServer {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self::with_bridge(DocumentBridge::new(connection))
    }

    pub fn with_bridge(bridge: DocumentBridge) -> Self {
        Self {
            bridge,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn bridge(&self) -> &DocumentBridge {
        &self.bridge
    }
}

#[tool_router]
impl GatewayServer {
    // ============================================================
    // Generic Document Tools
    // ============================================================

    #[tool(
        description = "Find a single document of a class. Class paths look like 'tracker.class.Issue'; call list_classes to see them all. Returns the document as JSON, or a not-found message."
    )]
    pub async fn find_one(
        &self,
        params: Parameters<FindRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "finding document",
            documents::find_one(&self.bridge, params.0).await,
        ))
    }

    #[tool(
        description = "Find all documents of a class matching a query. Options accept 'limit' and 'sort' (field -> 1 ascending, -1 descending). Returns a count followed by the documents as JSON."
    )]
    pub async fn find_all(
        &self,
        params: Parameters<FindRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "finding documents",
            documents::find_all(&self.bridge, params.0).await,
        ))
    }

    #[tool(
        description = "Create a document of a class in a space. Both are given as class paths. Returns the new document id."
    )]
    pub async fn create_doc(
        &self,
        params: Parameters<CreateDocRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "creating document",
            documents::create_doc(&self.bridge, params.0).await,
        ))
    }

    #[tool(
        description = "Apply update operations to a document. Operations are field values or instructions such as {\"$inc\": {\"sequence\": 1}}. Set retrieve to get the updated values back."
    )]
    pub async fn update_doc(
        &self,
        params: Parameters<UpdateDocRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "updating document",
            documents::update_doc(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Remove a document by class, space and id.")]
    pub async fn remove_doc(
        &self,
        params: Parameters<RemoveDocRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "removing document",
            documents::remove_doc(&self.bridge, params.0).await,
        ))
    }

    #[tool(
        description = "Create a sub-document inside a named collection of a parent document, e.g. a sub-issue in 'subIssues' of an issue. Returns the new item id."
    )]
    pub async fn add_collection(
        &self,
        params: Parameters<AddCollectionRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "adding collection item",
            documents::add_collection(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Apply update operations to an item of a parent document's collection.")]
    pub async fn update_collection(
        &self,
        params: Parameters<UpdateCollectionRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "updating collection item",
            documents::update_collection(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Remove an item from a parent document's collection.")]
    pub async fn remove_collection(
        &self,
        params: Parameters<RemoveCollectionRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "removing collection item",
            documents::remove_collection(&self.bridge, params.0).await,
        ))
    }

    #[tool(
        description = "Attach a mixin (an additional attribute set such as 'tracker.mixin.IssueTypeData') to an existing document."
    )]
    pub async fn create_mixin(
        &self,
        params: Parameters<MixinRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "creating mixin",
            documents::create_mixin(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Update the attributes of a mixin already attached to a document.")]
    pub async fn update_mixin(
        &self,
        params: Parameters<MixinRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "updating mixin",
            documents::update_mixin(&self.bridge, params.0).await,
        ))
    }

    #[tool(
        description = "List every class path the gateway can resolve, optionally for one module such as 'tracker'. Each line reads 'path -> reference'."
    )]
    pub async fn list_classes(
        &self,
        params: Parameters<ListClassesRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "listing classes",
            documents::list_classes(&self.bridge, params.0),
        ))
    }

    #[tool(
        description = "Connect to the platform if needed and check that it answers within the timeout."
    )]
    pub async fn check_connection(
        &self,
        params: Parameters<CheckConnectionRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "checking connection",
            documents::check_connection(&self.bridge, params.0).await,
        ))
    }

    // ============================================================
    // Tracker Tools
    // ============================================================

    #[tool(description = "List tracker projects with their identifiers. Archived projects are hidden unless include_archived is set.")]
    pub async fn list_projects(
        &self,
        params: Parameters<ListProjectsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "listing projects",
            tracker::list_projects(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Get a project by identifier as JSON.")]
    pub async fn get_project(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "getting project",
            tracker::get_project(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "List issues, optionally filtered by project, status name and priority. Newest first, 50 by default.")]
    pub async fn list_issues(
        &self,
        params: Parameters<ListIssuesRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "listing issues",
            tracker::list_issues(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Get an issue by identifier such as 'PROJ-12', including its description and status name.")]
    pub async fn get_issue(
        &self,
        params: Parameters<IssueRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "getting issue",
            tracker::get_issue(&self.bridge, params.0).await,
        ))
    }

    #[tool(
        description = "Create an issue in a project. Numbers it from the project sequence, ranks it last, and starts it in the project's default status."
    )]
    pub async fn create_issue(
        &self,
        params: Parameters<CreateIssueRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "creating issue",
            tracker::create_issue(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Update the title, description, priority, due date or estimation of an issue. Only given fields change.")]
    pub async fn update_issue(
        &self,
        params: Parameters<UpdateIssueRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "updating issue",
            tracker::update_issue(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Move an issue to another status by name. Call list_statuses for the available names.")]
    pub async fn change_issue_status(
        &self,
        params: Parameters<ChangeIssueStatusRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "changing issue status",
            tracker::change_issue_status(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Delete an issue by identifier.")]
    pub async fn delete_issue(
        &self,
        params: Parameters<IssueRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "deleting issue",
            tracker::delete_issue(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "Add a comment to an issue.")]
    pub async fn add_comment(
        &self,
        params: Parameters<AddCommentRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "adding comment",
            tracker::add_comment(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "List the comments on an issue, oldest first.")]
    pub async fn list_comments(
        &self,
        params: Parameters<IssueRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "listing comments",
            tracker::list_comments(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "List the issue statuses of the workspace.")]
    pub async fn list_statuses(&self) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "listing statuses",
            tracker::list_statuses(&self.bridge).await,
        ))
    }

    #[tool(description = "List the components of a project.")]
    pub async fn list_components(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "listing components",
            tracker::list_components(&self.bridge, params.0).await,
        ))
    }

    #[tool(description = "List the milestones of a project.")]
    pub async fn list_milestones(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(respond(
            "listing milestones",
            tracker::list_milestones(&self.bridge, params.0).await,
        ))
    }
}

fn user_prompt(description: &str, text: String) -> GetPromptResult {
    GetPromptResult {
        description: Some(description.to_string()),
        messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
    }
}

#[prompt_router]
impl GatewayServer {
    #[prompt(
        name = "create_bug_report",
        description = "File a well-formed bug report in a project"
    )]
    pub async fn create_bug_report(
        &self,
        params: Parameters<BugReportArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Ok(user_prompt(
            "File a bug report",
            prompts::create_bug_report(&params.0),
        ))
    }

    #[prompt(
        name = "triage_issues",
        description = "Review and prioritize the open issues of a project"
    )]
    pub async fn triage_issues(
        &self,
        params: Parameters<ProjectPromptArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Ok(user_prompt(
            "Triage project issues",
            prompts::triage_issues(&params.0),
        ))
    }

    #[prompt(
        name = "project_overview",
        description = "Summarize a project's components, milestones and issues"
    )]
    pub async fn project_overview(
        &self,
        params: Parameters<ProjectPromptArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Ok(user_prompt(
            "Project overview",
            prompts::project_overview(&params.0),
        ))
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for GatewayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "docbridge".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
            instructions: Some(
                r#"docbridge exposes a project-management platform's documents.

CLASS PATHS:
Documents are addressed by class paths of at least three dot-separated
segments: module.kind.Name, e.g. 'tracker.class.Issue' or 'core.space.Space'.
Call list_classes to see every path the gateway knows.

GENERIC TOOLS (any class):
- find_one / find_all: query documents, with optional limit and sort
- create_doc / update_doc / remove_doc: top-level documents in a space
- add_collection / update_collection / remove_collection: sub-documents
  attached to a parent document's named collection
- create_mixin / update_mixin: extra attribute sets on a document

TRACKER TOOLS (issues by identifier such as 'PROJ-12'):
- list_projects, get_project, list_components, list_milestones
- list_issues, get_issue, create_issue, update_issue, delete_issue
- list_statuses, change_issue_status
- add_comment, list_comments

RESOURCES:
- tracker://project/{identifier} and tracker://issue/{identifier} as JSON

Failures come back as tool results starting with 'Error <action>:'.
Use check_connection when the platform seems unreachable."#
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = resources::list(&self.bridge).await?;
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(
            resources::templates()?,
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        resources::read(&self.bridge, &request.uri).await
    }
}

impl GatewayServer {
    /// Read a resource without a request context.
    pub async fn read_uri(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        resources::read(&self.bridge, uri).await
    }

    pub async fn resource_list(&self) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(
            resources::list(&self.bridge).await?,
        ))
    }
}

pub async fn run_stdio_server(connection: Arc<Connection>) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = GatewayServer::new(connection);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}

/// Serve MCP over streamable HTTP at `/mcp` until Ctrl-C.
pub async fn run_http_server(connection: Arc<Connection>, port: u16) -> anyhow::Result<()> {
    let server = GatewayServer::new(connection);
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let app = Router::new()
        .nest_service("/mcp", service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("MCP server listening on http://127.0.0.1:{}/mcp", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
        })
        .await?;

    tracing::info!("MCP server stopped");
    Ok(())
}
