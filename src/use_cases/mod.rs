// Use cases layer: session handling, the token-refresh client, the chat wizard and pages.

pub mod auth;
pub mod client;
pub mod pages;
pub mod session;
pub mod wizard;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{AuthService, RegisterForm};
pub use client::ApiClient;
pub use session::SessionStore;
pub use wizard::ChatWizard;
