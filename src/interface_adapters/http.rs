use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::domain::errors::ApiError;
use crate::domain::ports::{ApiRequest, ApiResponse, HttpTransport, Method};

// Thin reqwest transport; every HTTP status is handed back to the interceptor.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        // A trailing slash keeps any path prefix of the base URL when joining.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::Transport(format!("invalid request path {path}: {err}")))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint(&request.path)?;
        let builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Patch => self.http.patch(url),
            Method::Delete => self.http.delete(url),
        };
        let builder = match &request.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_send_error)?;

        // Bodies that are not JSON (proxies, empty 204s) still carry a status.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        tracing::debug!(status, path = %request.path, "response received");

        Ok(ApiResponse { status, body })
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(err.to_string())
    }
}
