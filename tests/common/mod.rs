//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use payment_relay::{AppState, Config};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// What the stub answers with.
#[derive(Clone)]
pub struct StubReply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

#[allow(dead_code)]
impl StubReply {
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct StubState {
    reply: StubReply,
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Value>>>,
    api_keys: Arc<Mutex<Vec<Option<String>>>>,
}

/// In-process game server on an ephemeral port that records what it receives.
#[allow(dead_code)]
pub struct StubGameServer {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Value>>>,
    api_keys: Arc<Mutex<Vec<Option<String>>>>,
}

#[allow(dead_code)]
impl StubGameServer {
    pub async fn start(reply: StubReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = StubState {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            api_keys: Arc::new(Mutex::new(Vec::new())),
        };
        let server = Self {
            addr,
            calls: state.calls.clone(),
            received: state.received.clone(),
            api_keys: state.api_keys.clone(),
        };

        let app = Router::new()
            .route("/api/payment/process", post(stub_handler))
            .with_state(state);

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        server
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }

    pub fn api_keys(&self) -> Vec<Option<String>> {
        self.api_keys.lock().unwrap().clone()
    }
}

async fn stub_handler(
    State(state): State<StubState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state
        .received
        .lock()
        .unwrap()
        .push(serde_json::from_slice(&body).unwrap_or(Value::Null));
    state.api_keys.lock().unwrap().push(
        headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    if !state.reply.delay.is_zero() {
        tokio::time::sleep(state.reply.delay).await;
    }

    (
        state.reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.reply.body.clone(),
    )
}

/// Configuration pointing at `game_server_url`, otherwise defaults.
#[allow(dead_code)]
pub fn config_for(game_server_url: &str) -> Config {
    Config {
        game_server_url: game_server_url.to_string(),
        ..Config::default()
    }
}

/// A base URL nobody listens on.
#[allow(dead_code)]
pub fn closed_port_url() -> String {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    format!("http://127.0.0.1:{}", port)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Send one request through a freshly built application.
pub async fn send(config: Config, method: Method, uri: &str, body: &str) -> TestResponse {
    let app = payment_relay::router(AppState::new(config).unwrap());

    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}

#[allow(dead_code)]
pub async fn post_json(config: Config, uri: &str, body: &str) -> TestResponse {
    send(config, Method::POST, uri, body).await
}
