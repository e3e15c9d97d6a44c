use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use vastra_core::{Engine, VastraConfig};
use vastra_hub::{AppState, build_router};

fn state_with(edit: impl FnOnce(&mut VastraConfig)) -> Arc<AppState> {
    let mut config = VastraConfig::default();
    edit(&mut config);
    let engine = Engine::from_config(config).unwrap();
    Arc::new(AppState::new(Arc::new(engine)))
}

fn state() -> Arc<AppState> {
    state_with(|_| ())
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let s = state();
    let request = Request::builder()
        .uri("/v1/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&s, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_greeting_has_no_images_key() {
    let s = state();
    let (status, body) = send(&s, chat_request(json!({"message": "hello", "session_id": "a"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().len() > 10);
    assert!(body.get("images").is_none());
}

#[tokio::test]
async fn test_classified_turn_carries_empty_images() {
    let s = state();
    let (status, body) = send(
        &s,
        chat_request(json!({"message": "what should I wear to a wedding", "session_id": "b"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["images"], json!([]));
}

#[tokio::test]
async fn test_empty_message_prompts() {
    let s = state();
    let (status, body) = send(&s, chat_request(json!({"message": "   "}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"],
        "Please ask me something about fashion or beauty!"
    );
    // nothing was stored
    assert!(s.engine.store().is_empty());
}

#[tokio::test]
async fn test_missing_message_field_prompts() {
    let s = state();
    let (status, body) = send(&s, chat_request(json!({"session_id": "x"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"],
        "Please ask me something about fashion or beauty!"
    );
}

#[tokio::test]
async fn test_missing_session_uses_default() {
    let s = state();
    let (status, _) = send(&s, chat_request(json!({"message": "saree ideas"}))).await;

    assert_eq!(status, StatusCode::OK);
    let session = s.engine.store().snapshot("default").unwrap();
    assert_eq!(session.history, vec!["saree ideas"]);
}

#[tokio::test]
async fn test_context_carries_across_requests() {
    let s = state();
    send(&s, chat_request(json!({"message": "office wear ideas", "session_id": "c"}))).await;
    send(&s, chat_request(json!({"message": "for men", "session_id": "c"}))).await;

    let ctx = s.engine.store().snapshot("c").unwrap().context;
    assert_eq!(ctx.last_intent.unwrap().label(), "men_office");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let s = state();
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&s, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(
        s.metrics.bad_requests.load(std::sync::atomic::Ordering::Relaxed),
        1
    );
}

#[tokio::test]
async fn test_status_reports_sessions_and_turns() {
    let s = state();
    send(&s, chat_request(json!({"message": "hi", "session_id": "one"}))).await;
    send(&s, chat_request(json!({"message": "party makeup", "session_id": "two"}))).await;
    send(&s, chat_request(json!({"message": "what's the weather", "session_id": "three"}))).await;

    let request = Request::builder()
        .uri("/v1/status")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&s, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["sessions"], 3);
    assert_eq!(body["metrics"]["turns"]["total"], 3);
    assert_eq!(body["metrics"]["turns"]["by_category"]["greeting"], 1);
    assert_eq!(body["metrics"]["turns"]["by_category"]["classified"], 1);
    assert_eq!(body["metrics"]["turns"]["by_category"]["out_of_scope"], 1);
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let s = state_with(|c| c.server.rate_limit_per_minute = 2);

    let from = |ip: &'static str| {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(json!({"message": "saree"}).to_string()))
            .unwrap()
    };

    assert_eq!(send(&s, from("10.0.0.1")).await.0, StatusCode::OK);
    assert_eq!(send(&s, from("10.0.0.1")).await.0, StatusCode::OK);
    let (status, body) = send(&s, from("10.0.0.1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("Max 2"));

    assert_eq!(send(&s, from("10.0.0.2")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_keys_direct_clients_by_peer() {
    let s = state_with(|c| c.server.rate_limit_per_minute = 2);

    let from = |peer: &'static str| {
        let addr: SocketAddr = peer.parse().unwrap();
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .extension(ConnectInfo(addr))
            .body(Body::from(json!({"message": "saree"}).to_string()))
            .unwrap()
    };

    assert_eq!(send(&s, from("192.168.1.10:50000")).await.0, StatusCode::OK);
    assert_eq!(send(&s, from("192.168.1.10:50001")).await.0, StatusCode::OK);
    // a different machine still has its own budget
    assert_eq!(send(&s, from("192.168.1.20:50000")).await.0, StatusCode::OK);
    // same machine, new port: same budget
    assert_eq!(
        send(&s, from("192.168.1.10:50002")).await.0,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_index_page_and_request_id() {
    let s = state();
    let response = build_router(s)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/chat"));
}
