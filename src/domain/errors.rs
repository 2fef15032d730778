use std::collections::BTreeMap;
use std::fmt;

// Failures surfaced by the authenticated API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // Request never produced a response.
    Transport(String),
    // Blanket request timeout elapsed.
    Timeout,
    // Backend answered with a non-success status.
    Upstream {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },
    // Response body did not match the expected shape.
    Decode(String),
    // Envelope arrived without `data`.
    EmptyResponse,
    // No token pair is stored.
    Unauthenticated,
    // Refresh exchange failed; the session has been cleared.
    SessionExpired,
    Storage(String),
    Validation(ValidationErrors),
}

impl ApiError {
    // The expiry signal that triggers a refresh-and-replay.
    pub fn is_token_expired(&self) -> bool {
        matches!(
            self,
            ApiError::Upstream { status: 401, code: Some(code), .. }
                if code == TOKEN_EXPIRED_CODE || code == INVALID_TOKEN_CODE
        )
    }
}

// Application error codes carried in 401 bodies.
pub const TOKEN_EXPIRED_CODE: &str = "TOKEN_EXPIRED";
pub const INVALID_TOKEN_CODE: &str = "INVALID_TOKEN";

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "transport error: {err}"),
            ApiError::Timeout => write!(f, "request timed out"),
            ApiError::Upstream {
                status,
                code,
                message,
            } => match (code, message) {
                (Some(code), Some(message)) => write!(f, "upstream error {status} ({code}): {message}"),
                (None, Some(message)) => write!(f, "upstream error {status}: {message}"),
                (Some(code), None) => write!(f, "upstream error {status} ({code})"),
                (None, None) => write!(f, "upstream error {status}"),
            },
            ApiError::Decode(err) => write!(f, "response decode error: {err}"),
            ApiError::EmptyResponse => write!(f, "response carried no data"),
            ApiError::Unauthenticated => write!(f, "not logged in"),
            ApiError::SessionExpired => write!(f, "session expired, please log in again"),
            ApiError::Storage(err) => write!(f, "storage error: {err}"),
            ApiError::Validation(errors) => write!(f, "invalid input: {errors}"),
        }
    }
}

impl std::error::Error for ApiError {}

// Form-level validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    // First message per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}
