// Mock marketplace backend served by axum on an ephemeral port.
#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use serde_json::{Value, json};
use url::Url;

use grounds_client::domain::{Role, Session, TokenPair};
use grounds_client::interface_adapters::api::MarketplaceApi;
use grounds_client::interface_adapters::http::ReqwestTransport;
use grounds_client::interface_adapters::state::ShellNavigator;
use grounds_client::interface_adapters::storage::MemoryStorage;
use grounds_client::use_cases::ApiClient;

pub const REFRESH_TOKEN: &str = "refresh-1";
pub const RENEWED_TOKEN: &str = "access-2";

// Counters and switches shared between the handlers and the test body.
pub struct Backend {
    pub refresh_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    pub refresh_fails: AtomicBool,
    // Access token the backend currently accepts.
    pub valid_token: Mutex<String>,
    // Payload returned inside `data` by the generate endpoint; `None` omits `data`.
    pub generate_reply: Mutex<Option<Value>>,
}

impl Backend {
    pub fn new(valid_token: &str) -> Arc<Self> {
        Arc::new(Self {
            refresh_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            refresh_fails: AtomicBool::new(false),
            valid_token: Mutex::new(valid_token.to_string()),
            generate_reply: Mutex::new(None),
        })
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn set_generate_reply(&self, reply: Option<Value>) {
        *self.generate_reply.lock().expect("generate reply lock") = reply;
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_token.lock().expect("token lock"));
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == expected)
    }
}

type Reply = (StatusCode, Json<Value>);

fn expired() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "code": "TOKEN_EXPIRED", "message": "access token expired" })),
    )
}

async fn refresh(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Reply {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // Widen the window in which concurrent requests pile up behind the refresh.
    tokio::time::sleep(Duration::from_millis(50)).await;

    if backend.refresh_fails.load(Ordering::SeqCst) || body["refreshToken"] != REFRESH_TOKEN {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": "INVALID_REFRESH_TOKEN", "message": "refresh rejected" })),
        );
    }
    *backend.valid_token.lock().expect("token lock") = RENEWED_TOKEN.to_string();
    (
        StatusCode::OK,
        Json(json!({ "data": { "accessToken": RENEWED_TOKEN } })),
    )
}

async fn my_pickups(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    if !backend.authorized(&headers) {
        return expired();
    }
    (
        StatusCode::OK,
        Json(json!({ "data": [{
            "id": "p1",
            "cafeId": "c1",
            "scheduledAt": "2026-10-20T10:00:00Z",
            "status": "pending"
        }] })),
    )
}

async fn my_cafe(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Reply {
    if !backend.authorized(&headers) {
        return expired();
    }
    (
        StatusCode::OK,
        Json(json!({ "data": { "id": "c1", "name": "Bean There", "address": "Seoul" } })),
    )
}

async fn cafes() -> Reply {
    (
        StatusCode::OK,
        Json(json!({ "data": [
            { "id": "c1", "name": "Bean There", "address": "Seoul", "latitude": 37.5, "longitude": 127.0 },
            { "id": "c2", "name": "No Pin", "address": "Busan" }
        ] })),
    )
}

async fn generate(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> Reply {
    if !backend.authorized(&headers) {
        return expired();
    }
    backend.generate_calls.fetch_add(1, Ordering::SeqCst);
    match backend.generate_reply.lock().expect("generate reply lock").clone() {
        Some(data) => (StatusCode::OK, Json(json!({ "data": data }))),
        None => (StatusCode::OK, Json(json!({}))),
    }
}

// Serve the mock backend for the lifetime of the test runtime.
pub async fn spawn_backend(backend: Arc<Backend>) -> Url {
    let app = Router::new()
        .route("/api/auth/refresh", post(refresh))
        .route("/api/pickups/my", get(my_pickups))
        .route("/api/cafes/me", get(my_cafe))
        .route("/api/cafes", get(cafes))
        .route("/api/solutions/generate", post(generate))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend failed");
    });
    Url::parse(&format!("http://{addr}")).expect("mock backend url")
}

pub struct TestClient {
    pub api: MarketplaceApi,
    pub storage: MemoryStorage,
    pub navigator: Arc<ShellNavigator>,
}

pub fn sample_session() -> Session {
    Session {
        user_id: "u1".to_string(),
        display_name: "Mina".to_string(),
        email: "mina@example.com".to_string(),
        role: Role::User,
        avatar_url: None,
    }
}

// Real reqwest transport against the mock backend, logged in with `access_token`.
pub async fn logged_in_client(base_url: Url, access_token: &str) -> TestClient {
    let transport = ReqwestTransport::new(base_url, Duration::from_secs(5)).expect("transport");
    let storage = MemoryStorage::default();
    let navigator = Arc::new(ShellNavigator::default());
    let client = Arc::new(ApiClient::new(
        Arc::new(transport),
        Arc::new(storage.clone()),
        navigator.clone(),
    ));
    client
        .session()
        .save(&sample_session(), &TokenPair::new(access_token, REFRESH_TOKEN))
        .await
        .expect("seed session");

    TestClient {
        api: MarketplaceApi::new(client),
        storage,
        navigator,
    }
}
