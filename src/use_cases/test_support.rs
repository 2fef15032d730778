use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::errors::ApiError;
use crate::domain::ports::{
    ApiRequest, ApiResponse, HttpTransport, Navigator, Notification, Notifier, TokenStorage,
};
use crate::domain::routes::Route;
use crate::domain::session::{Role, Session};

pub(crate) fn sample_session(role: Role) -> Session {
    Session {
        user_id: "u-1".to_string(),
        display_name: "Mina".to_string(),
        email: "mina@example.com".to_string(),
        role,
        avatar_url: None,
    }
}

pub(crate) fn ok_data(data: Value) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: json!({ "data": data }),
    }
}

pub(crate) fn expired_response() -> ApiResponse {
    ApiResponse {
        status: 401,
        body: json!({ "code": "TOKEN_EXPIRED", "message": "jwt expired" }),
    }
}

// In-memory storage the tests can inspect and tamper with.
#[derive(Clone, Default)]
pub(crate) struct RecordingStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: bool,
}

impl RecordingStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub(crate) fn value(&self, key: &str) -> Option<String> {
        let guard = self.values.lock().expect("storage mutex poisoned");
        guard.get(key).cloned()
    }

    pub(crate) fn seed(&self, key: &str, value: &str) {
        let mut guard = self.values.lock().expect("storage mutex poisoned");
        guard.insert(key.to_string(), value.to_string());
    }

    pub(crate) fn forget(&self, key: &str) {
        let mut guard = self.values.lock().expect("storage mutex poisoned");
        guard.remove(key);
    }
}

#[async_trait]
impl TokenStorage for RecordingStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), String> {
        if self.fail_writes {
            return Err("set failed".to_string());
        }
        let mut guard = self.values.lock().expect("storage mutex poisoned");
        guard.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, String> {
        let mut guard = self.values.lock().expect("storage mutex poisoned");
        Ok(guard.remove(key).is_some())
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingNavigator {
    visited: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn visited(&self) -> Vec<Route> {
        self.visited.lock().expect("navigator mutex poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.visited
            .lock()
            .expect("navigator mutex poisoned")
            .push(route);
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn seen(&self) -> Vec<Notification> {
        self.seen.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
    }
}

// Transport answering from per-path queues; unscripted paths get a 404.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<HashMap<String, VecDeque<Result<ApiResponse, ApiError>>>>>,
    sent: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, path: &str, response: ApiResponse) {
        self.push(path, Ok(response));
    }

    pub(crate) fn respond_status(&self, path: &str, status: u16, body: Value) {
        self.push(path, Ok(ApiResponse { status, body }));
    }

    pub(crate) fn fail(&self, path: &str, error: ApiError) {
        self.push(path, Err(error));
    }

    fn push(&self, path: &str, entry: Result<ApiResponse, ApiError>) {
        let mut guard = self.script.lock().expect("script mutex poisoned");
        guard.entry(path.to_string()).or_default().push_back(entry);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }

    pub(crate) fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }

    pub(crate) fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let path = request.path.clone();
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push(request);

        let mut guard = self.script.lock().expect("script mutex poisoned");
        guard
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Ok(ApiResponse {
                    status: 404,
                    body: json!({ "code": "NOT_FOUND" }),
                })
            })
    }
}
