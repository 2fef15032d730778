use std::sync::Arc;

use serde_json::json;

use crate::domain::errors::{ApiError, ValidationErrors};
use crate::domain::ports::ApiRequest;
use crate::domain::routes::Route;
use crate::domain::session::{Role, Session, TokenPair};
use crate::interface_adapters::protocol::{
    GoogleLoginRequest, LoginRequest, LoginResponse, RegisterRequest,
};
use crate::use_cases::client::ApiClient;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const GOOGLE_LOGIN_PATH: &str = "/api/auth/login/google";
pub const REGISTER_PATH: &str = "/api/auth/register";

const MIN_PASSWORD_LEN: usize = 8;

// Sign-up form as entered on the register page.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub display_name: String,
    pub role: Role,
    // Required for cafe accounts only.
    pub cafe_name: Option<String>,
    pub address: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();

        if !is_plausible_email(&self.email) {
            errors.add("email", "올바른 이메일 주소를 입력하세요.");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add("password", "비밀번호는 8자 이상이어야 합니다.");
        }
        if self.password != self.password_confirm {
            errors.add("passwordConfirm", "비밀번호가 일치하지 않습니다.");
        }
        if self.display_name.trim().is_empty() {
            errors.add("displayName", "이름을 입력하세요.");
        }
        if self.role == Role::Cafe {
            if is_blank(self.cafe_name.as_deref()) {
                errors.add("cafeName", "카페 이름을 입력하세요.");
            }
            if is_blank(self.address.as_deref()) {
                errors.add("address", "카페 주소를 입력하세요.");
            }
        }

        errors.into_result()
    }
}

// Login, logout and sign-up on top of the authenticated client.
#[derive(Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    #[tracing::instrument(name = "login", skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let email = email.trim();
        let mut errors = ValidationErrors::new();
        if !is_plausible_email(email) {
            errors.add("email", "올바른 이메일 주소를 입력하세요.");
        }
        if password.is_empty() {
            errors.add("password", "비밀번호를 입력하세요.");
        }
        errors.into_result()?;

        let request = ApiRequest::post(LOGIN_PATH, json!(LoginRequest { email, password }));
        let response = self.client.public_data::<LoginResponse>(request).await?;
        self.establish(response).await
    }

    #[tracing::instrument(name = "login_google", skip_all)]
    pub async fn login_google(&self, id_token: &str) -> Result<Session, ApiError> {
        if id_token.trim().is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("idToken", "Google 인증 정보가 없습니다.");
            return Err(ApiError::Validation(errors));
        }

        let request = ApiRequest::post(GOOGLE_LOGIN_PATH, json!(GoogleLoginRequest { id_token }));
        let response = self.client.public_data::<LoginResponse>(request).await?;
        self.establish(response).await
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<(), ApiError> {
        form.validate()?;

        let payload = RegisterRequest {
            email: form.email.trim(),
            password: &form.password,
            display_name: form.display_name.trim(),
            role: form.role,
            cafe_name: form.cafe_name.as_deref().map(str::trim),
            address: form.address.as_deref().map(str::trim),
        };
        self.client
            .send_public(ApiRequest::post(REGISTER_PATH, json!(payload)))
            .await?;

        tracing::info!(role = ?form.role, "account registered");
        self.client.navigator().navigate(Route::Login);
        Ok(())
    }

    // Clears all stored credentials and returns to the landing page.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let cleared = self.client.session().clear().await;
        self.client.navigator().navigate(Route::Home);
        tracing::info!("logged out");
        cleared
    }

    // Reload a persisted session at startup; half-stored credentials are dropped.
    pub async fn restore(&self) -> Result<Option<Session>, ApiError> {
        let session = self.client.session().authenticated_session().await?;
        if session.is_none() {
            self.client.session().clear().await?;
        }
        Ok(session)
    }

    pub async fn current(&self) -> Result<Option<Session>, ApiError> {
        self.client.session().authenticated_session().await
    }

    async fn establish(&self, response: LoginResponse) -> Result<Session, ApiError> {
        let tokens = TokenPair::new(response.access_token, response.refresh_token);
        if !tokens.is_complete() {
            return Err(ApiError::Decode("login response without tokens".to_string()));
        }

        let session = response.user;
        self.client.session().save(&session, &tokens).await?;
        tracing::info!(user_id = %session.user_id, role = ?session.role, "logged in");

        self.client.navigator().navigate(session.role.home_route());
        Ok(session)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn is_plausible_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
