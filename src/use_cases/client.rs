use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;

use crate::domain::errors::ApiError;
use crate::domain::ports::{ApiRequest, ApiResponse, HttpTransport, Navigator, TokenStorage};
use crate::domain::routes::Route;
use crate::interface_adapters::protocol::{RefreshRequest, RefreshResponse, decode_data, into_result};
use crate::use_cases::session::SessionStore;

pub const REFRESH_PATH: &str = "/api/auth/refresh";

// Authenticated API client: attaches bearer tokens and renews them on expiry.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    // Serializes refresh exchanges so concurrent expiries share one call.
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session: SessionStore::new(storage),
            navigator,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    // Send without credentials and without the refresh path (auth endpoints).
    pub async fn send_public(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        request.bearer = None;
        into_result(self.transport.send(request).await?)
    }

    pub async fn public_data<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send_public(request).await?;
        decode_data(response.body)
    }

    #[tracing::instrument(name = "api_request", skip_all, fields(method = ?request.method, path = %request.path))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let access = self.session.access_token().await?;
        request.bearer = access.clone();

        let first = into_result(self.transport.send(request.clone()).await?);
        let err = match first {
            Ok(response) => return Ok(response),
            Err(err) if err.is_token_expired() => err,
            Err(err) => return Err(err),
        };

        tracing::info!(error = %err, "access token rejected, refreshing");
        let renewed = self.refresh(access).await?;

        // Replay exactly once; a second rejection is returned as-is.
        request.bearer = Some(renewed);
        into_result(self.transport.send(request).await?)
    }

    // Send and unwrap the `{ data }` envelope.
    pub async fn data<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        decode_data(response.body)
    }

    // Send where only success matters (deletes, status updates).
    pub async fn execute(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    // Exchange the refresh token; `stale` is the access token the failed request carried.
    async fn refresh(&self, stale: Option<String>) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let Some(tokens) = self.session.tokens().await? else {
            // Either never logged in, or a concurrent refresh already failed and logged out.
            return Err(if stale.is_some() {
                ApiError::SessionExpired
            } else {
                ApiError::Unauthenticated
            });
        };

        if stale.as_deref() != Some(tokens.access_token.as_str()) {
            tracing::debug!("access token already renewed by a concurrent request");
            return Ok(tokens.access_token);
        }

        let exchange = ApiRequest::post(
            REFRESH_PATH,
            json!(RefreshRequest {
                refresh_token: &tokens.refresh_token,
            }),
        );
        let renewed = match self.public_data::<RefreshResponse>(exchange).await {
            Ok(renewed) => renewed,
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed, ending session");
                return Err(self.expire_session().await);
            }
        };

        self.session
            .replace_access_token(renewed.access_token.clone())
            .await?;
        if let Some(refresh_token) = renewed.refresh_token {
            self.session.replace_refresh_token(refresh_token).await?;
        }
        tracing::info!("access token refreshed");
        Ok(renewed.access_token)
    }

    async fn expire_session(&self) -> ApiError {
        if let Err(err) = self.session.clear().await {
            tracing::error!(error = %err, "failed to clear expired session");
        }
        self.navigator.navigate(Route::Login);
        ApiError::SessionExpired
    }
}
