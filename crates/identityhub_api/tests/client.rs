use std::time::Duration;

use identityhub_api::auth;
use identityhub_api::form::{build_payload, classify, TicketDraft, TicketTarget};
use identityhub_api::models::{IssueTypeSchema, LoginCredentials};
use identityhub_api::poll::{wait_until_indexed, IndexState, PollPolicy};
use identityhub_api::{HubClient, HubConfig, HubError};
use mockito::{Matcher, Server};
use serde_json::json;

fn client_for(server: &Server, config: HubConfig) -> HubClient {
    let config = HubConfig {
        base_url: server.url(),
        ..config
    }
    .with_cooldown(Duration::ZERO);
    HubClient::new(config).expect("client builds")
}

#[tokio::test]
async fn connection_status_sends_api_key_header() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/jira/status")
        .match_header("x-api-key", "ihk_test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"isConnected":true,"connectedAt":"2024-05-01T12:00:00Z","siteUrl":"https://acme.atlassian.net"}"#)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default().with_api_key("ihk_test"));
    let status = client.connection_status().await.expect("status");

    assert!(status.is_connected);
    assert_eq!(status.site_url.as_deref(), Some("https://acme.atlassian.net"));
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_responses_map_to_authentication_errors() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/jira/projects")
        .with_status(401)
        .with_body(r#"{"err":"Not authenticated"}"#)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default());
    let err = client.projects().await.unwrap_err();

    assert!(err.is_auth(), "unexpected error {err:?}");
}

#[tokio::test]
async fn metadata_without_projects_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/jira/projects/PROJ/metadata")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"projects":[]}"#)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default().with_session("tok"));
    let err = client.project_metadata("PROJ").await.unwrap_err();

    assert!(matches!(err, HubError::NotFound(ref message) if message.contains("No project data found")));
}

#[tokio::test]
async fn metadata_feeds_classifier_and_created_issue_is_posted() {
    let mut server = Server::new_async().await;
    let metadata = server
        .mock("GET", "/api/jira/projects/PROJ/metadata")
        .match_header("cookie", "loginToken=tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "projects": [{
                    "key": "PROJ",
                    "issuetypes": [{
                        "id": "10001",
                        "name": "Task",
                        "fields": {
                            "summary": { "name": "Summary", "required": true, "schema": { "type": "string" } },
                            "customfield_10050": {
                                "name": "Severity",
                                "required": true,
                                "allowedValues": [{ "id": "1", "value": "Low" }, { "id": "2", "value": "High" }],
                                "schema": { "type": "option" }
                            }
                        }
                    }]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let create = server
        .mock("POST", "/api/jira/issues")
        .match_body(Matcher::PartialJson(json!({
            "project": { "key": "PROJ" },
            "issuetype": { "id": "10001" },
            "customfield_10050": { "id": "1" },
            "labels": ["created-from-identityhub"]
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"10100","key":"PROJ-42"}"#)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default().with_session("tok"));
    let project = client.project_metadata("PROJ").await.expect("metadata");
    let issue_type = project.issue_type("10001").expect("task issue type");
    let classification = classify(&issue_type.fields);

    let draft = TicketDraft {
        summary: "Stale service account".into(),
        description: "svc-deploy-prod unused for 120 days".into(),
        ..TicketDraft::default()
    };
    let payload = build_payload(
        &TicketTarget::new("PROJ", &issue_type.id),
        &draft,
        &classification.fields,
        &classification.seed,
    )
    .expect("payload builds");
    let created = client.create_issue(&payload).await.expect("created");

    assert_eq!(created.key, "PROJ-42");
    metadata.assert_async().await;
    create.assert_async().await;
}

#[tokio::test]
async fn remote_validation_errors_keep_backend_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/jira/issues")
        .with_status(400)
        .with_body(r#"{"code":"JIRA_ERROR","message":"Field 'customfield_1' cannot be set"}"#)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default());
    let schema = IssueTypeSchema::new();
    let classification = classify(&schema);
    let draft = TicketDraft {
        summary: "S".into(),
        description: "D".into(),
        ..TicketDraft::default()
    };
    let payload = build_payload(
        &TicketTarget::new("PROJ", "10001"),
        &draft,
        &classification.fields,
        &classification.seed,
    )
    .unwrap();

    match client.create_issue(&payload).await.unwrap_err() {
        HubError::Http { code, message, .. } => {
            assert_eq!(code.as_deref(), Some("JIRA_ERROR"));
            assert_eq!(message, "Field 'customfield_1' cannot be set");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn recent_issues_pass_max_results() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/jira/projects/SEC/issues")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "5".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"1","key":"SEC-1","fields":{"summary":"First"}}]"#)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default());
    let issues = client.recent_issues("SEC", Some(5)).await.expect("issues");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].summary(), "First");
    mock.assert_async().await;
}

#[tokio::test]
async fn api_keys_are_listed_generated_and_deleted() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/api/apikeys")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"apiKeys":[{"id":"k1","name":"ci","createdAt":"2024-01-01T00:00:00Z","isActive":true}]}"#)
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/api/apikeys")
        .match_body(Matcher::Json(json!({ "name": "scanner" })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"k2","name":"scanner","apiKey":"ihk_secret","createdAt":"2024-01-02T00:00:00Z"}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/apikeys/k1")
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default().with_session("tok"));

    let keys = client.api_keys().await.expect("keys");
    assert_eq!(keys[0].name, "ci");

    let generated = client.generate_api_key("  scanner ").await.expect("generated");
    assert_eq!(generated.api_key, "ihk_secret");

    client.delete_api_key("k1").await.expect("deleted");

    list.assert_async().await;
    generate.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn blank_api_key_name_never_reaches_the_backend() {
    let server = Server::new_async().await;
    let client = client_for(&server, HubConfig::default());

    let err = client.generate_api_key("   ").await.unwrap_err();
    assert!(matches!(err, HubError::InvalidInput(_)));
}

#[tokio::test]
async fn login_returns_user_and_session_cookie() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(json!({ "email": "ana@example.com", "password": "pw" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("set-cookie", "loginToken=sess-123; Path=/; HttpOnly")
        .with_body(r#"{"_id":"u1","name":"Ana","email":"ana@example.com","isOnboarded":true}"#)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default());
    let session = auth::login(
        &client,
        &LoginCredentials {
            email: "ana@example.com".into(),
            password: "pw".into(),
        },
    )
    .await
    .expect("login");

    assert_eq!(session.token, "sess-123");
    assert_eq!(session.user.id, "u1");
    assert_eq!(session.user.display(), "Ana");
    mock.assert_async().await;
}

#[tokio::test]
async fn poll_returns_as_soon_as_ticket_is_listed() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/jira/issues/identityhub")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"2","key":"PROJ-2","fields":{}},{"id":"1","key":"PROJ-1","fields":{}}]"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default());
    let policy = PollPolicy {
        attempts: 4,
        interval: Duration::ZERO,
    };
    let state = wait_until_indexed(&client, "PROJ-1", policy).await.expect("poll");

    assert!(matches!(state, IndexState::Indexed(ref issue) if issue.id == "1"));
    mock.assert_async().await;
}

#[tokio::test]
async fn poll_gives_up_after_configured_attempts() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/jira/issues/identityhub")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server, HubConfig::default());
    let policy = PollPolicy {
        attempts: 3,
        interval: Duration::ZERO,
    };
    let state = wait_until_indexed(&client, "PROJ-9", policy).await.expect("poll");

    assert!(matches!(state, IndexState::TimedOut { attempts: 3 }));
    assert!(!state.is_indexed());
    mock.assert_async().await;
}
