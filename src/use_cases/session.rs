use std::sync::Arc;

use crate::domain::errors::ApiError;
use crate::domain::ports::TokenStorage;
use crate::domain::session::{Session, TokenPair};

// Fixed storage keys; logout clears all three together.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const SESSION_KEY: &str = "session";

// Typed view over the durable storage holding the session and its tokens.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    pub async fn access_token(&self) -> Result<Option<String>, ApiError> {
        self.read(ACCESS_TOKEN_KEY).await
    }

    pub async fn tokens(&self) -> Result<Option<TokenPair>, ApiError> {
        let access = self.read(ACCESS_TOKEN_KEY).await?;
        let refresh = self.read(REFRESH_TOKEN_KEY).await?;
        Ok(match (access, refresh) {
            (Some(access), Some(refresh)) => {
                Some(TokenPair::new(access, refresh)).filter(TokenPair::is_complete)
            }
            _ => None,
        })
    }

    // Stored session, ignoring corrupt entries.
    pub async fn session(&self) -> Result<Option<Session>, ApiError> {
        let Some(raw) = self.read(SESSION_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable stored session");
                Ok(None)
            }
        }
    }

    // A session only counts when both tokens are present.
    pub async fn authenticated_session(&self) -> Result<Option<Session>, ApiError> {
        if self.tokens().await?.is_none() {
            return Ok(None);
        }
        self.session().await
    }

    pub async fn save(&self, session: &Session, tokens: &TokenPair) -> Result<(), ApiError> {
        let raw = serde_json::to_string(session).map_err(|err| ApiError::Storage(err.to_string()))?;
        self.write(ACCESS_TOKEN_KEY, tokens.access_token.clone()).await?;
        self.write(REFRESH_TOKEN_KEY, tokens.refresh_token.clone()).await?;
        self.write(SESSION_KEY, raw).await
    }

    pub async fn replace_access_token(&self, access_token: String) -> Result<(), ApiError> {
        self.write(ACCESS_TOKEN_KEY, access_token).await
    }

    pub async fn replace_refresh_token(&self, refresh_token: String) -> Result<(), ApiError> {
        self.write(REFRESH_TOKEN_KEY, refresh_token).await
    }

    // Removes every key even when one removal fails; reports the first failure.
    pub async fn clear(&self) -> Result<(), ApiError> {
        let mut first_error = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEY] {
            if let Err(err) = self.storage.remove(key).await {
                tracing::warn!(key, error = %err, "failed to clear storage key");
                first_error.get_or_insert(ApiError::Storage(err));
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn read(&self, key: &str) -> Result<Option<String>, ApiError> {
        self.storage.get(key).await.map_err(ApiError::Storage)
    }

    async fn write(&self, key: &str, value: String) -> Result<(), ApiError> {
        self.storage.set(key, value).await.map_err(ApiError::Storage)
    }
}
