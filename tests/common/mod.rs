//! In-memory platform used by the integration tests.
//!
//! `MockPlatform` stores documents as JSON objects tagged with their class
//! reference and records every primitive it receives. Queries match on field
//! equality; sort and limit are honoured.

#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::ErrorData;
use serde_json::{json, Value};

use docbridge::config::PlatformConfig;
use docbridge::mcp::GatewayServer;
use docbridge::platform::{
    CollectionItem, ConnectOptions, Connection, Connector, Document, FindOptions, MarkupFormat,
    MixinTarget, PlatformClient, RemoteError, Session,
};
use docbridge::registry::{ClassRef, NamespaceRegistry};

pub const WORKSPACE: &str = "ws-test";
pub const URL: &str = "http://platform.test";

/// Resolve a class path against the builtin registry.
pub fn class(path: &str) -> ClassRef {
    NamespaceRegistry::builtin()
        .resolve(path)
        .expect("builtin class path")
}

pub fn obj(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

#[derive(Default)]
pub struct MockPlatform {
    docs: Mutex<Vec<(ClassRef, Document)>>,
    markup: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    fail_all: AtomicBool,
    stall_account: AtomicBool,
    fail_close: AtomicBool,
    closes: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a document directly, bypassing the call log.
    pub fn seed(&self, class_path: &str, doc: Value) {
        self.docs
            .lock()
            .unwrap()
            .push((class(class_path), obj(doc)));
    }

    pub fn seed_markup(&self, reference: &str, text: &str) {
        self.markup
            .lock()
            .unwrap()
            .insert(reference.to_string(), text.to_string());
    }

    pub fn docs_of(&self, class_path: &str) -> Vec<Document> {
        let class = class(class_path);
        self.docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == class)
            .map(|(_, d)| d.clone())
            .collect()
    }

    pub fn doc(&self, id: &str) -> Option<Document> {
        self.docs
            .lock()
            .unwrap()
            .iter()
            .find(|(_, d)| d.get("_id").and_then(Value::as_str) == Some(id))
            .map(|(_, d)| d.clone())
    }

    pub fn markup_text(&self, reference: &str) -> Option<String> {
        self.markup.lock().unwrap().get(reference).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn stall_account(&self, stall: bool) {
        self.stall_account.store(stall, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    fn enter(&self, op: &str) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(op.to_string());
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("platform unavailable".into()));
        }
        Ok(())
    }

    fn fresh_id(&self) -> String {
        format!("gen-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn query(&self, class: &ClassRef, query: &Document, options: &FindOptions) -> Vec<Document> {
        let mut found: Vec<Document> = self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, d)| c == class && query.iter().all(|(k, v)| d.get(k) == Some(v)))
            .map(|(_, d)| d.clone())
            .collect();

        if let Some((field, direction)) = options.sort.as_ref().and_then(|s| s.iter().next()) {
            found.sort_by(|a, b| {
                let ord = compare(a.get(field), b.get(field));
                if *direction < 0 {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        if let Some(limit) = options.limit {
            found.truncate(limit as usize);
        }
        found
    }

    fn apply(&self, id: &str, operations: &Document) -> Result<Document, RemoteError> {
        let mut docs = self.docs.lock().unwrap();
        let (_, doc) = docs
            .iter_mut()
            .find(|(_, d)| d.get("_id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| RemoteError::NotFound(format!("document {}", id)))?;

        for (key, value) in operations {
            if key == "$inc" {
                for (field, by) in value.as_object().into_iter().flatten() {
                    let current = doc.get(field).and_then(Value::as_i64).unwrap_or(0);
                    doc.insert(field.clone(), json!(current + by.as_i64().unwrap_or(0)));
                }
            } else {
                doc.insert(key.clone(), value.clone());
            }
        }
        Ok(doc.clone())
    }

    fn remove(&self, id: &str) -> Result<(), RemoteError> {
        let mut docs = self.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|(_, d)| d.get("_id").and_then(Value::as_str) != Some(id));
        if docs.len() == before {
            return Err(RemoteError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None, Some(_)) => CmpOrdering::Less,
        (Some(_), None) => CmpOrdering::Greater,
        _ => CmpOrdering::Equal,
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn find_one(
        &self,
        class: &ClassRef,
        query: &Document,
        options: &FindOptions,
    ) -> Result<Option<Document>, RemoteError> {
        self.enter("find_one")?;
        Ok(self.query(class, query, options).into_iter().next())
    }

    async fn find_all(
        &self,
        class: &ClassRef,
        query: &Document,
        options: &FindOptions,
    ) -> Result<Vec<Document>, RemoteError> {
        self.enter("find_all")?;
        Ok(self.query(class, query, options))
    }

    async fn create_doc(
        &self,
        class: &ClassRef,
        space: &str,
        attributes: &Document,
        id: &str,
    ) -> Result<String, RemoteError> {
        self.enter("create_doc")?;
        let mut doc = attributes.clone();
        doc.insert("_id".into(), json!(id));
        doc.insert("space".into(), json!(space));
        self.docs.lock().unwrap().push((class.clone(), doc));
        Ok(id.to_string())
    }

    async fn update_doc(
        &self,
        _class: &ClassRef,
        _space: &str,
        id: &str,
        operations: &Document,
        retrieve: bool,
    ) -> Result<Value, RemoteError> {
        self.enter("update_doc")?;
        let updated = self.apply(id, operations)?;
        Ok(if retrieve {
            json!({ "object": updated })
        } else {
            json!({})
        })
    }

    async fn remove_doc(&self, _class: &ClassRef, _space: &str, id: &str) -> Result<(), RemoteError> {
        self.enter("remove_doc")?;
        self.remove(id)
    }

    async fn add_collection(
        &self,
        item: &CollectionItem,
        attributes: &Document,
    ) -> Result<String, RemoteError> {
        self.enter("add_collection")?;
        let mut doc = attributes.clone();
        doc.insert("_id".into(), json!(item.id));
        doc.insert("space".into(), json!(item.space));
        doc.insert("attachedTo".into(), json!(item.attached_to));
        doc.insert("attachedToClass".into(), json!(item.attached_to_class));
        doc.insert("collection".into(), json!(item.collection));
        self.docs.lock().unwrap().push((item.class.clone(), doc));
        Ok(item.id.clone())
    }

    async fn update_collection(
        &self,
        item: &CollectionItem,
        operations: &Document,
        retrieve: bool,
    ) -> Result<Value, RemoteError> {
        self.enter("update_collection")?;
        let updated = self.apply(&item.id, operations)?;
        Ok(if retrieve {
            json!({ "object": updated })
        } else {
            json!({})
        })
    }

    async fn remove_collection(&self, item: &CollectionItem) -> Result<(), RemoteError> {
        self.enter("remove_collection")?;
        self.remove(&item.id)
    }

    async fn create_mixin(
        &self,
        target: &MixinTarget,
        attributes: &Document,
    ) -> Result<(), RemoteError> {
        self.enter("create_mixin")?;
        let mut ops = Document::new();
        ops.insert(target.mixin.to_string(), Value::Object(attributes.clone()));
        self.apply(&target.object_id, &ops).map(|_| ())
    }

    async fn update_mixin(
        &self,
        target: &MixinTarget,
        attributes: &Document,
    ) -> Result<(), RemoteError> {
        self.enter("update_mixin")?;
        let existing = self
            .doc(&target.object_id)
            .and_then(|d| d.get(target.mixin.as_str()).cloned())
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        let mut merged = existing;
        merged.extend(attributes.clone());
        let mut ops = Document::new();
        ops.insert(target.mixin.to_string(), Value::Object(merged));
        self.apply(&target.object_id, &ops).map(|_| ())
    }

    async fn upload_markup(
        &self,
        _class: &ClassRef,
        id: &str,
        attribute: &str,
        text: &str,
        _format: MarkupFormat,
    ) -> Result<String, RemoteError> {
        self.enter("upload_markup")?;
        let reference = format!("markup-{}-{}", id, attribute);
        self.seed_markup(&reference, text);
        Ok(reference)
    }

    async fn fetch_markup(
        &self,
        _class: &ClassRef,
        _id: &str,
        _attribute: &str,
        markup: &str,
        _format: MarkupFormat,
    ) -> Result<String, RemoteError> {
        self.enter("fetch_markup")?;
        self.markup_text(markup)
            .ok_or_else(|| RemoteError::NotFound(format!("markup {}", markup)))
    }

    async fn account(&self) -> Result<Value, RemoteError> {
        self.enter("account")?;
        if self.stall_account.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(json!({ "email": "agent@example.com" }))
    }

    async fn close(&self) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push("close".into());
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(RemoteError::Server("close failed".into()));
        }
        Ok(())
    }
}

/// Hands out the same `MockPlatform` on every connect and counts attempts.
pub struct MockConnector {
    platform: Arc<MockPlatform>,
    connects: AtomicUsize,
    fail: AtomicBool,
    delay: Duration,
}

impl MockConnector {
    pub fn new(platform: Arc<MockPlatform>) -> Arc<Self> {
        Self::with_delay(platform, Duration::ZERO)
    }

    pub fn with_delay(platform: Arc<MockPlatform>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            platform,
            connects: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delay,
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _options: &ConnectOptions) -> Result<Session, RemoteError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(RemoteError::Unauthorized);
        }
        Ok(self.platform.clone())
    }
}

pub fn config() -> PlatformConfig {
    PlatformConfig::new(URL, WORKSPACE).with_token("test-token")
}

pub struct Harness {
    pub platform: Arc<MockPlatform>,
    pub connector: Arc<MockConnector>,
    pub connection: Arc<Connection>,
    pub server: GatewayServer,
}

pub fn harness() -> Harness {
    let platform = MockPlatform::new();
    let connector = MockConnector::new(platform.clone());
    let connection = Arc::new(Connection::new(config(), connector.clone()));
    let server = GatewayServer::new(connection.clone());
    Harness {
        platform,
        connector,
        connection,
        server,
    }
}

/// Seed a tracker workspace: project PROJ with statuses and two issues.
pub fn seed_tracker(platform: &MockPlatform) {
    platform.seed(
        "tracker.class.IssueStatus",
        json!({ "_id": "status-backlog", "name": "Backlog" }),
    );
    platform.seed(
        "tracker.class.IssueStatus",
        json!({ "_id": "status-todo", "name": "Todo" }),
    );
    platform.seed(
        "tracker.class.IssueStatus",
        json!({ "_id": "status-progress", "name": "In Progress" }),
    );
    platform.seed(
        "tracker.class.Project",
        json!({
            "_id": "project-1",
            "space": "core:space:Space",
            "identifier": "PROJ",
            "name": "Platform",
            "description": "Core platform work",
            "sequence": 2,
            "archived": false,
            "defaultIssueStatus": "status-backlog"
        }),
    );
    platform.seed(
        "tracker.class.Project",
        json!({
            "_id": "project-2",
            "identifier": "OLD",
            "name": "Legacy",
            "sequence": 0,
            "archived": true
        }),
    );
    platform.seed_markup("markup-issue-1", "The login page hangs.");
    platform.seed(
        "tracker.class.Issue",
        json!({
            "_id": "issue-1",
            "space": "project-1",
            "identifier": "PROJ-1",
            "number": 1,
            "title": "Login hangs",
            "description": "markup-issue-1",
            "status": "status-todo",
            "priority": 1,
            "rank": "m",
            "attachedTo": "tracker:ids:NoParent",
            "attachedToClass": "tracker:class:Issue",
            "collection": "subIssues",
            "modifiedOn": 1_700_000_000_000_i64
        }),
    );
    platform.seed(
        "tracker.class.Issue",
        json!({
            "_id": "issue-2",
            "space": "project-1",
            "identifier": "PROJ-2",
            "number": 2,
            "title": "Dark mode",
            "status": "status-backlog",
            "priority": 4,
            "rank": "n",
            "attachedTo": "tracker:ids:NoParent",
            "attachedToClass": "tracker:class:Issue",
            "collection": "subIssues",
            "modifiedOn": 1_700_000_100_000_i64
        }),
    );
}

/// Text of the first content block of a tool result.
pub fn text(result: &Result<CallToolResult, ErrorData>) -> String {
    result
        .as_ref()
        .expect("tool result")
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

pub fn is_error(result: &Result<CallToolResult, ErrorData>) -> bool {
    result.as_ref().expect("tool result").is_error == Some(true)
}
