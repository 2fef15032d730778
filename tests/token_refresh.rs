mod support;

use grounds_client::domain::ports::TokenStorage;
use grounds_client::domain::{ApiError, Route};
use grounds_client::use_cases::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEY};
use support::{Backend, RENEWED_TOKEN, logged_in_client, spawn_backend};

#[tokio::test]
async fn concurrent_expiries_share_a_single_refresh() {
    let backend = Backend::new(RENEWED_TOKEN);
    let base_url = spawn_backend(backend.clone()).await;
    let client = logged_in_client(base_url, "access-1").await;

    let (pickups, cafe, again) = tokio::join!(
        client.api.my_pickups(),
        client.api.my_cafe(),
        client.api.my_pickups(),
    );

    assert_eq!(pickups.expect("pickups replayed").len(), 1);
    assert_eq!(cafe.expect("cafe replayed").id, "c1");
    assert_eq!(again.expect("second pickups replayed").len(), 1);
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(
        client.storage.get(ACCESS_TOKEN_KEY).await.expect("read").as_deref(),
        Some(RENEWED_TOKEN)
    );
}

#[tokio::test]
async fn valid_token_never_touches_refresh() {
    let backend = Backend::new("access-1");
    let base_url = spawn_backend(backend.clone()).await;
    let client = logged_in_client(base_url, "access-1").await;

    client.api.my_pickups().await.expect("pickups");
    client.api.my_cafe().await.expect("cafe");

    assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn failed_refresh_logs_out_and_redirects_to_login() {
    let backend = Backend::new(RENEWED_TOKEN);
    backend
        .refresh_fails
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let base_url = spawn_backend(backend.clone()).await;
    let client = logged_in_client(base_url, "access-1").await;

    let result = client.api.my_pickups().await;

    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(client.navigator.current(), Route::Login);
    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEY] {
        assert_eq!(client.storage.get(key).await.expect("read"), None, "{key} survived logout");
    }
}

#[tokio::test]
async fn public_listing_works_without_a_session() {
    let backend = Backend::new("access-1");
    let base_url = spawn_backend(backend.clone()).await;
    let client = logged_in_client(base_url, "access-1").await;
    client.api.client().session().clear().await.expect("clear");

    let cafes = client.api.list_cafes().await.expect("cafes");

    assert_eq!(cafes.len(), 2);
    assert_eq!(cafes[1].latitude, None);
}
