//! Wire contract of the HTTP platform client.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docbridge::platform::{
    CollectionItem, ConnectOptions, Connector, Credentials, Document, FindOptions, HttpConnector,
    RemoteError, Session,
};
use docbridge::registry::ClassRef;

const WS: &str = "/api/v1/workspaces/ws-1";

fn options(server: &MockServer, credentials: Credentials) -> ConnectOptions {
    ConnectOptions {
        url: server.uri(),
        workspace: "ws-1".into(),
        credentials,
        timeout: Duration::from_secs(5),
    }
}

async fn mount_account(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{}/account", WS)))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "agent@example.com" })))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> Session {
    mount_account(server, "tok").await;
    HttpConnector::new()
        .connect(&options(server, Credentials::Token("tok".into())))
        .await
        .expect("connects")
}

fn issue_class() -> ClassRef {
    ClassRef::new("tracker:class:Issue")
}

mod connect {
    use super::*;

    #[tokio::test]
    async fn verifies_a_token_against_the_account_endpoint() {
        let server = MockServer::start().await;
        let session = connect(&server).await;
        let account = session.account().await.expect("account");
        assert_eq!(account["email"], "agent@example.com");
    }

    #[tokio::test]
    async fn exchanges_a_password_for_a_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/login"))
            .and(body_partial_json(json!({ "email": "agent@example.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "from-login" })))
            .expect(1)
            .mount(&server)
            .await;
        mount_account(&server, "from-login").await;

        HttpConnector::new()
            .connect(&options(
                &server,
                Credentials::Password {
                    email: "agent@example.com".into(),
                    password: "pw".into(),
                },
            ))
            .await
            .expect("connects");
    }

    #[tokio::test]
    async fn rejected_credentials_are_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/account", WS)))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = HttpConnector::new()
            .connect(&options(&server, Credentials::Token("bad".into())))
            .await
            .err()
            .expect("fails");
        assert!(matches!(err, RemoteError::Unauthorized));
    }
}

mod calls {
    use super::*;

    #[tokio::test]
    async fn find_one_posts_class_query_and_options() {
        let server = MockServer::start().await;
        let session = connect(&server).await;
        Mock::given(method("POST"))
            .and(path(format!("{}/find-one", WS)))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(json!({
                "class": "tracker:class:Issue",
                "query": { "identifier": "PROJ-1" },
                "options": { "limit": 1 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_id": "issue-1" })))
            .mount(&server)
            .await;

        let mut query = Document::new();
        query.insert("identifier".into(), json!("PROJ-1"));
        let found = session
            .find_one(&issue_class(), &query, &FindOptions::default().limit(1))
            .await
            .expect("finds")
            .expect("some");
        assert_eq!(found["_id"], "issue-1");
    }

    #[tokio::test]
    async fn a_null_body_is_no_match() {
        let server = MockServer::start().await;
        let session = connect(&server).await;
        Mock::given(method("POST"))
            .and(path(format!("{}/find-one", WS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
            .mount(&server)
            .await;

        let found = session
            .find_one(&issue_class(), &Document::new(), &FindOptions::default())
            .await
            .expect("finds");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn add_collection_sends_the_attachment() {
        let server = MockServer::start().await;
        let session = connect(&server).await;
        Mock::given(method("POST"))
            .and(path(format!("{}/add-collection", WS)))
            .and(body_partial_json(json!({
                "class": "chunter:class:ChatMessage",
                "space": "project-1",
                "objectId": "comment-1",
                "attachedTo": "issue-1",
                "attachedToClass": "tracker:class:Issue",
                "collection": "comments",
                "attributes": { "message": "hi" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "comment-1" })))
            .mount(&server)
            .await;

        let mut attributes = Document::new();
        attributes.insert("message".into(), json!("hi"));
        let id = session
            .add_collection(
                &CollectionItem {
                    class: ClassRef::new("chunter:class:ChatMessage"),
                    space: "project-1".into(),
                    id: "comment-1".into(),
                    attached_to: "issue-1".into(),
                    attached_to_class: issue_class(),
                    collection: "comments".into(),
                },
                &attributes,
            )
            .await
            .expect("adds");
        assert_eq!(id, "comment-1");
    }
}

mod errors {
    use super::*;

    async fn failing(status: u16, body: &str) -> RemoteError {
        let server = MockServer::start().await;
        let session = connect(&server).await;
        Mock::given(method("POST"))
            .and(path(format!("{}/remove-doc", WS)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;

        session
            .remove_doc(&issue_class(), "project-1", "issue-1")
            .await
            .err()
            .expect("fails")
    }

    #[tokio::test]
    async fn maps_status_codes() {
        assert!(matches!(failing(404, "gone").await, RemoteError::NotFound(b) if b == "gone"));
        assert!(matches!(failing(400, "bad").await, RemoteError::BadRequest(b) if b == "bad"));
        assert!(matches!(failing(401, "").await, RemoteError::Unauthorized));
        assert!(matches!(failing(500, "boom").await, RemoteError::Server(m) if m.contains("boom")));
    }

    #[tokio::test]
    async fn a_closed_session_makes_no_requests() {
        let server = MockServer::start().await;
        let session = connect(&server).await;

        session.close().await.expect("closes");
        let err = session.account().await.err().expect("fails");

        assert!(matches!(err, RemoteError::Closed));
        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
    }
}
