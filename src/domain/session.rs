use serde::{Deserialize, Serialize};

use crate::domain::routes::Route;

// Account kind; decides which dashboard a login lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Cafe,
}

impl Role {
    // Landing page after a successful login.
    pub fn home_route(self) -> Route {
        match self {
            Role::Cafe => Route::CafeDashboard,
            Role::User => Route::Map,
        }
    }
}

// Logged-in identity persisted next to the token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

// Opaque credentials issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    // Empty strings count as missing credentials.
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}
