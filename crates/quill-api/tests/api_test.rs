use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::stream;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use quill_api::{build_router, config::Config, state::AppState};
use quill_llm::{ChatClient, ChatRequest, ChatResponse, EventStream, LlmResult, StreamEvent};
use quill_persist::{NewMessage, NewVersion, Stores};
use quill_router::TurnPipeline;

const CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [cors]
    enabled = true
    origins = ["*"]

    [llm]
    model = "gpt-4o"
    classifier_model = "gpt-4o-mini"
    temperature = 0.7
    max_history_tokens = 4000

    [logging]
    level = "debug"
    format = "pretty"
"#;

/// Always classifies as `intent` and streams `chunks`
struct ScriptedClient {
    intent: &'static str,
    chunks: Vec<&'static str>,
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, _request: ChatRequest) -> LlmResult<ChatResponse> {
        Ok(ChatResponse {
            content: Some(json!({ "intent": self.intent }).to_string()),
            usage: None,
            finish_reason: Some("stop".to_string()),
            raw: Value::Null,
        })
    }

    async fn chat_stream(&self, _request: ChatRequest) -> LlmResult<EventStream> {
        let mut events: Vec<LlmResult<StreamEvent>> = self
            .chunks
            .iter()
            .map(|c| Ok(StreamEvent::Message { content: c.to_string() }))
            .collect();
        events.push(Ok(StreamEvent::Done { finish_reason: Some("stop".to_string()) }));
        Ok(Box::pin(stream::iter(events)))
    }
}

fn app_with(client: ScriptedClient) -> (Router, Stores) {
    let config: Config = toml::from_str(CONFIG).unwrap();
    let stores = Stores::in_memory();
    let pipeline = TurnPipeline::builder()
        .llm_client(Arc::new(client))
        .stores(stores.clone())
        .router_config(config.router.clone())
        .build()
        .unwrap();

    let state = Arc::new(AppState::new(config, stores.clone(), pipeline));
    (build_router(state), stores)
}

fn app() -> (Router, Stores) {
    app_with(ScriptedClient {
        intent: "draft",
        chunks: vec!["Short post about launch day."],
    })
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn member_request(method: &str, uri: &str, user: &str, orgs: &str, body: Option<Value>) -> Request<Body> {
    let mut req = request(method, uri, Some(user), body);
    req.headers_mut()
        .insert("x-organization-ids", orgs.parse().unwrap());
    req
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, req).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_thread(app: &Router, user: &str) -> String {
    let (status, body) = send_json(app, request("POST", "/threads", Some(user), Some(json!({})))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["thread_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send_json(&app, request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["storage"], "connected");
}

#[tokio::test]
async fn test_missing_caller_is_unauthorized() {
    let (app, _) = app();
    let (status, body) = send_json(&app, request("GET", "/threads", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-user-id"));
}

#[tokio::test]
async fn test_thread_crud_and_access() {
    let (app, _) = app();
    let thread_id = create_thread(&app, "u1").await;
    let uri = format!("/threads/{}", thread_id);

    let (status, body) = send_json(&app, request("GET", &uri, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u1");

    let (status, _) = send(&app, request("GET", &uri, Some("u2"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &app,
        request("PATCH", &uri, Some("u1"), Some(json!({ "title": "Launch week" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Launch week");

    let (status, _) = send(
        &app,
        request("PATCH", &uri, Some("u1"), Some(json!({ "title": "  " }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(&app, request("GET", "/threads", Some("u1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["threads"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, request("DELETE", &uri, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request("GET", &uri, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_foreign_organization_is_bad_request() {
    let (app, _) = app();
    let (status, _) = send(
        &app,
        request("POST", "/threads", Some("u1"), Some(json!({ "organization_id": "acme" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_organization_member_reads_thread() {
    let (app, _) = app();
    let create = Request::builder()
        .method("POST")
        .uri("/threads")
        .header("x-user-id", "u1")
        .header("x-organization-ids", "acme, globex")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "organization_id": "acme" }).to_string()))
        .unwrap();
    let (status, body) = send_json(&app, create).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/threads/{}", body["thread_id"].as_str().unwrap());

    let member = Request::builder()
        .uri(&uri)
        .header("x-user-id", "u2")
        .header("x-organization-ids", "acme")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, member).await;
    assert_eq!(status, StatusCode::OK);

    // Members can read but not delete
    let delete = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header("x-user-id", "u2")
        .header("x-organization-ids", "acme")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_organization_member_cannot_change_drafts() {
    let (app, stores) = app();
    let (status, body) = send_json(
        &app,
        member_request("POST", "/threads", "u1", "acme", Some(json!({ "organization_id": "acme" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let thread_id = body["thread_id"].as_str().unwrap().to_string();
    let revision = stores
        .draft_service()
        .create(&thread_id, None, NewVersion::new("Owner's words"))
        .await
        .unwrap();
    let base = format!("/drafts/{}", revision.draft.id);

    let (status, _) = send(&app, member_request("GET", &base, "u2", "acme", None)).await;
    assert_eq!(status, StatusCode::OK);

    let attempts = [
        ("PATCH", base.clone(), Some(json!({ "title": "Mine now" }))),
        ("DELETE", base.clone(), None),
        ("POST", format!("{}/versions", base), Some(json!({ "content": "Rewritten" }))),
        ("PUT", format!("{}/versions/1", base), Some(json!({ "content": "Rewritten" }))),
        ("POST", format!("/threads/{}/messages", thread_id), Some(json!({ "content": "Announce Q3" }))),
    ];
    for (method, uri, body) in attempts {
        let (status, _) = send(&app, member_request(method, &uri, "u2", "acme", body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
    }

    let draft = stores.draft_service().get(&revision.draft.id).await.unwrap();
    assert_eq!(draft.current_version, 1);
    let version = stores.draft_service().get_version(&draft.id, 1).await.unwrap();
    assert_eq!(version.content, "Owner's words");
    let messages = stores
        .thread_service()
        .list_messages(&thread_id, None, None)
        .await
        .unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_draft_turn_streams_and_stores_version() {
    let (app, _) = app_with(ScriptedClient {
        intent: "draft",
        chunks: vec![
            "Excited to share our Q3 results! ",
            "Revenue grew 40% and our community doubled. ",
            "Thank you to everyone who built this with us.",
        ],
    });
    let thread_id = create_thread(&app, "u1").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            &format!("/threads/{}/messages", thread_id),
            Some("u1"),
            Some(json!({ "content": "Announce Q3", "context": { "summary": "B2B analytics startup" } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let sse = String::from_utf8(body).unwrap();
    assert!(sse.contains("event: turn_started"));
    assert!(sse.contains("event: intent"));
    assert!(sse.contains("event: delta"));
    assert!(sse.contains("event: completed"));
    assert!(!sse.contains("event: clear_draft"));

    let (_, drafts) = send_json(
        &app,
        request("GET", &format!("/threads/{}/drafts", thread_id), Some("u1"), None),
    )
    .await;
    let drafts = drafts.as_array().unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0]["current_version"], 1);

    let draft_id = drafts[0]["draft_id"].as_str().unwrap();
    let (_, versions) = send_json(
        &app,
        request("GET", &format!("/drafts/{}/versions", draft_id), Some("u1"), None),
    )
    .await;
    assert_eq!(
        versions[0]["content"],
        "Excited to share our Q3 results! Revenue grew 40% and our community doubled. Thank you to everyone who built this with us."
    );

    let (_, messages) = send_json(
        &app,
        request("GET", &format!("/threads/{}/messages", thread_id), Some("u1"), None),
    )
    .await;
    let messages = messages["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["intent"], "draft");
    assert_eq!(messages[1]["sequence"], 1);
    assert_eq!(versions[0]["parent_message_id"], messages[1]["message_id"]);
}

#[tokio::test]
async fn test_question_turn_clears_preview() {
    let (app, _) = app_with(ScriptedClient {
        intent: "draft",
        chunks: vec![
            "Can you tell me more about the launch? ",
            "Who is the audience, and what tone should it take?",
        ],
    });
    let thread_id = create_thread(&app, "u1").await;

    let (_, body) = send(
        &app,
        request(
            "POST",
            &format!("/threads/{}/messages", thread_id),
            Some("u1"),
            Some(json!({ "content": "Write a launch post" })),
        ),
    )
    .await;
    let sse = String::from_utf8(body).unwrap();
    assert!(sse.contains("event: clear_draft"));
    assert!(sse.contains(r#""channel":"conversation""#));

    let (_, drafts) = send_json(
        &app,
        request("GET", &format!("/threads/{}/drafts", thread_id), Some("u1"), None),
    )
    .await;
    assert!(drafts.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_turn_on_unknown_thread_is_not_found() {
    let (app, _) = app();
    let (status, body) = send_json(
        &app,
        request("POST", "/threads/missing/messages", Some("u1"), Some(json!({ "content": "hi" }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_draft_version_endpoints() {
    let (app, stores) = app();
    let thread_id = create_thread(&app, "u1").await;
    let revision = stores
        .draft_service()
        .create(&thread_id, None, NewVersion::new("First take"))
        .await
        .unwrap();
    let base = format!("/drafts/{}", revision.draft.id);

    let (status, body) = send_json(
        &app,
        request(
            "POST",
            &format!("{}/versions", base),
            Some("u1"),
            Some(json!({ "content": "Second take", "edit_prompt": "tighter" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["version"]["version"], 2);
    assert_eq!(body["draft"]["current_version"], 2);

    let (status, body) = send_json(
        &app,
        request(
            "PUT",
            &format!("{}/versions/1", base),
            Some("u1"),
            Some(json!({ "content": "First take, fixed typo" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "First take, fixed typo");

    let (_, draft) = send_json(&app, request("GET", &base, Some("u1"), None)).await;
    assert_eq!(draft["current_version"], 2);

    let (status, _) = send(&app, request("GET", &format!("{}/versions/9", base), Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("GET", &base, Some("u2"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &app,
        request("PATCH", &base, Some("u1"), Some(json!({ "title": "Q3 post" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Q3 post");

    let (status, body) = send_json(
        &app,
        request("POST", &format!("{}/schedule", base), Some("u1"), Some(json!({ "version": 1 }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], "First take, fixed typo");
    assert_eq!(body["status"], "saved");
    assert_eq!(body["thread_id"], thread_id.as_str());

    let (status, _) = send(&app, request("DELETE", &base, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request("GET", &base, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_schedule_lifecycle() {
    let (app, _) = app();

    let (status, _) = send(
        &app,
        request("POST", "/scheduled", Some("u1"), Some(json!({ "content": "   " }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, row) = send_json(
        &app,
        request("POST", "/scheduled", Some("u1"), Some(json!({ "content": "Launch day!" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(row["status"], "saved");
    let uri = format!("/scheduled/{}", row["id"].as_str().unwrap());

    let (status, row) = send_json(
        &app,
        request("PATCH", &uri, Some("u1"), Some(json!({ "scheduled_at": "2026-03-01T16:00:00Z" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["status"], "scheduled");

    let (status, days) = send_json(
        &app,
        request("GET", "/scheduled/calendar?tz=Asia/Tokyo", Some("u1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(days[0]["date"], "2026-03-02");
    assert_eq!(days[0]["items"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        request("GET", "/scheduled/calendar?tz=Mars/Olympus", Some("u1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, row) = send_json(
        &app,
        request("PATCH", &uri, Some("u1"), Some(json!({ "status": "posted" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["status"], "posted");
    assert!(row["posted_at"].is_string());

    let (status, _) = send(
        &app,
        request("PATCH", &uri, Some("u1"), Some(json!({ "status": "saved" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, rows) = send_json(&app, request("GET", "/scheduled?status=posted", Some("u1"), None)).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    let (_, rows) = send_json(&app, request("GET", "/scheduled?status=saved", Some("u1"), None)).await;
    assert!(rows.as_array().unwrap().is_empty());

    let (status, _) = send(&app, request("GET", &uri, Some("u2"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("DELETE", &uri, Some("u1"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_feedback_replaces_previous_rating() {
    let (app, stores) = app();
    let thread_id = create_thread(&app, "u1").await;
    let message = stores
        .thread_service()
        .append_message(NewMessage::assistant(&thread_id, "Here is your post."))
        .await
        .unwrap();
    let uri = format!("/messages/{}/feedback", message.id);

    for text in ["too long", "perfect now"] {
        let (status, _) = send(
            &app,
            request("PUT", &uri, Some("u1"), Some(json!({ "kind": "up", "text": text }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, all) = send_json(
        &app,
        request("GET", &format!("/threads/{}/feedback", thread_id), Some("u1"), None),
    )
    .await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["text"], "perfect now");

    let (status, _) = send(&app, request("GET", &uri, Some("u2"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request("PUT", "/messages/missing/feedback", Some("u1"), Some(json!({ "kind": "down" }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document() {
    let (app, _) = app();
    let (status, doc) = send_json(&app, request("GET", "/api-docs/openapi.json", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/threads/{thread_id}/messages"].is_object());
    assert!(doc["paths"]["/scheduled/calendar"].is_object());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _) = app();
    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_api_error_response() {
    use axum::response::IntoResponse;
    use quill_api::error::ApiError;
    use quill_persist::PersistError;

    let response = ApiError::BadRequest("Test error".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ApiError::from(PersistError::DraftNotFound("d1".into())).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ApiError::from(PersistError::Internal("boom".into())).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
