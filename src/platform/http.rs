//! HTTP client for the platform's document API.
//!
//! Every primitive is a `POST {url}/api/v1/workspaces/{workspace}/{op}` with a
//! bearer token and a camelCase JSON body. When no token is configured the
//! connector first exchanges the email/password pair at `/api/v1/login`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    CollectionItem, ConnectOptions, Connector, Credentials, Document, FindOptions, MarkupFormat,
    MixinTarget, PlatformClient, RemoteError, Session,
};
use crate::registry::ClassRef;

/// Connects to the platform over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector;

impl HttpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, options: &ConnectOptions) -> Result<Session, RemoteError> {
        let client = Client::builder().connect_timeout(options.timeout).build()?;

        let token = match &options.credentials {
            Credentials::Token(token) => token.clone(),
            Credentials::Password { email, password } => {
                let response = client
                    .post(format!("{}/api/v1/login", options.url))
                    .json(&json!({ "email": email, "password": password }))
                    .send()
                    .await?;
                let login: LoginResponse = handle_response(response).await?;
                login.token
            }
        };

        let session = HttpPlatformClient::new(client, &options.url, &options.workspace, token);
        // Authenticate once up front so bad credentials fail the connect.
        session.account().await?;
        Ok(Arc::new(session))
    }
}

/// One authenticated session against a workspace.
#[derive(Debug)]
pub struct HttpPlatformClient {
    base_url: String,
    token: String,
    client: Client,
    closed: AtomicBool,
}

impl HttpPlatformClient {
    pub fn new(client: Client, url: &str, workspace: &str, token: impl Into<String>) -> Self {
        Self {
            base_url: format!("{}/api/v1/workspaces/{}", url.trim_end_matches('/'), workspace),
            token: token.into(),
            client,
            closed: AtomicBool::new(false),
        }
    }

    /// Build a request with the bearer token.
    fn request(
        &self,
        method: reqwest::Method,
        op: &str,
    ) -> Result<reqwest::RequestBuilder, RemoteError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RemoteError::Closed);
        }
        let url = format!("{}/{}", self.base_url, op);
        Ok(self.client.request(method, &url).bearer_auth(&self.token))
    }

    async fn call<T: DeserializeOwned>(&self, op: &str, body: Value) -> Result<T, RemoteError> {
        tracing::debug!(op, "Platform call");
        let response = self
            .request(reqwest::Method::POST, op)?
            .json(&body)
            .send()
            .await?;
        handle_response(response).await
    }

    async fn call_empty(&self, op: &str, body: Value) -> Result<(), RemoteError> {
        tracing::debug!(op, "Platform call");
        let response = self
            .request(reqwest::Method::POST, op)?
            .json(&body)
            .send()
            .await?;
        handle_empty_response(response).await
    }
}

/// Handle response, converting HTTP errors to RemoteError.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        Err(status_error(status, response).await)
    }
}

/// Handle response that may return an empty body.
async fn handle_empty_response(response: reqwest::Response) -> Result<(), RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(status_error(status, response).await)
    }
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> RemoteError {
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(body),
        StatusCode::BAD_REQUEST => RemoteError::BadRequest(body),
        StatusCode::UNAUTHORIZED => RemoteError::Unauthorized,
        _ => RemoteError::Server(format!("{}: {}", status, body)),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RemoteError> {
    serde_json::to_value(value).map_err(|e| RemoteError::Rejected(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MarkupResponse {
    markup: String,
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn find_one(
        &self,
        class: &ClassRef,
        query: &Document,
        options: &FindOptions,
    ) -> Result<Option<Document>, RemoteError> {
        self.call(
            "find-one",
            json!({ "class": class, "query": query, "options": options }),
        )
        .await
    }

    async fn find_all(
        &self,
        class: &ClassRef,
        query: &Document,
        options: &FindOptions,
    ) -> Result<Vec<Document>, RemoteError> {
        self.call(
            "find-all",
            json!({ "class": class, "query": query, "options": options }),
        )
        .await
    }

    async fn create_doc(
        &self,
        class: &ClassRef,
        space: &str,
        attributes: &Document,
        id: &str,
    ) -> Result<String, RemoteError> {
        let created: IdResponse = self
            .call(
                "create-doc",
                json!({ "class": class, "space": space, "attributes": attributes, "objectId": id }),
            )
            .await?;
        Ok(created.id)
    }

    async fn update_doc(
        &self,
        class: &ClassRef,
        space: &str,
        id: &str,
        operations: &Document,
        retrieve: bool,
    ) -> Result<Value, RemoteError> {
        self.call(
            "update-doc",
            json!({
                "class": class,
                "space": space,
                "objectId": id,
                "operations": operations,
                "retrieve": retrieve
            }),
        )
        .await
    }

    async fn remove_doc(&self, class: &ClassRef, space: &str, id: &str) -> Result<(), RemoteError> {
        self.call_empty(
            "remove-doc",
            json!({ "class": class, "space": space, "objectId": id }),
        )
        .await
    }

    async fn add_collection(
        &self,
        item: &CollectionItem,
        attributes: &Document,
    ) -> Result<String, RemoteError> {
        let mut body = encode(item)?;
        body["attributes"] = Value::Object(attributes.clone());
        let created: IdResponse = self.call("add-collection", body).await?;
        Ok(created.id)
    }

    async fn update_collection(
        &self,
        item: &CollectionItem,
        operations: &Document,
        retrieve: bool,
    ) -> Result<Value, RemoteError> {
        let mut body = encode(item)?;
        body["operations"] = Value::Object(operations.clone());
        body["retrieve"] = Value::Bool(retrieve);
        self.call("update-collection", body).await
    }

    async fn remove_collection(&self, item: &CollectionItem) -> Result<(), RemoteError> {
        let body = encode(item)?;
        self.call_empty("remove-collection", body).await
    }

    async fn create_mixin(
        &self,
        target: &MixinTarget,
        attributes: &Document,
    ) -> Result<(), RemoteError> {
        let mut body = encode(target)?;
        body["attributes"] = Value::Object(attributes.clone());
        self.call_empty("create-mixin", body).await
    }

    async fn update_mixin(
        &self,
        target: &MixinTarget,
        attributes: &Document,
    ) -> Result<(), RemoteError> {
        let mut body = encode(target)?;
        body["attributes"] = Value::Object(attributes.clone());
        self.call_empty("update-mixin", body).await
    }

    async fn upload_markup(
        &self,
        class: &ClassRef,
        id: &str,
        attribute: &str,
        text: &str,
        format: MarkupFormat,
    ) -> Result<String, RemoteError> {
        let uploaded: MarkupResponse = self
            .call(
                "upload-markup",
                json!({
                    "objectClass": class,
                    "objectId": id,
                    "objectAttr": attribute,
                    "value": text,
                    "format": format
                }),
            )
            .await?;
        Ok(uploaded.markup)
    }

    async fn fetch_markup(
        &self,
        class: &ClassRef,
        id: &str,
        attribute: &str,
        markup: &str,
        format: MarkupFormat,
    ) -> Result<String, RemoteError> {
        let fetched: MarkupResponse = self
            .call(
                "fetch-markup",
                json!({
                    "objectClass": class,
                    "objectId": id,
                    "objectAttr": attribute,
                    "markup": markup,
                    "format": format
                }),
            )
            .await?;
        Ok(fetched.markup)
    }

    async fn account(&self) -> Result<Value, RemoteError> {
        let response = self.request(reqwest::Method::GET, "account")?.send().await?;
        handle_response(response).await
    }

    async fn close(&self) -> Result<(), RemoteError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
