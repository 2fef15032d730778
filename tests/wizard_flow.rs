mod support;

use serde_json::json;

use grounds_client::domain::{ChatOption, MessageRole, WizardState};
use grounds_client::use_cases::ChatWizard;
use support::{Backend, RENEWED_TOKEN, logged_in_client, spawn_backend};

fn recommendation(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": "커피박을 말려서 사용합니다.",
        "tags": ["방향제"],
        "difficulty": "쉬움",
        "duration": "30분",
        "materials": ["커피박", "천 주머니"],
        "steps": ["커피박을 말린다", "주머니에 담는다"]
    })
}

#[tokio::test]
async fn purpose_and_material_produce_a_recommendation_with_alternates() {
    let backend = Backend::new("access-1");
    backend.set_generate_reply(Some(json!({
        "recommendation": recommendation("r1", "커피박 방향제"),
        "alternatives": [recommendation("r2", "커피박 향초")]
    })));
    let base_url = spawn_backend(backend.clone()).await;
    let client = logged_in_client(base_url, "access-1").await;
    let mut wizard = ChatWizard::new(client.api.clone());

    wizard.submit_text("방향제").await;
    assert!(matches!(wizard.state(), WizardState::AskingMaterial { purpose } if purpose == "방향제"));

    wizard.submit_text("에티오피아").await;
    let last = wizard.conversation().last().expect("result message");
    assert_eq!(last.role, MessageRole::Assistant);
    assert_eq!(last.recommendation.as_ref().map(|r| r.id.as_str()), Some("r1"));
    assert_eq!(
        last.options,
        vec![ChatOption::ViewAlternate, ChatOption::GenerateAnother, ChatOption::Restart]
    );
    // The loading message was replaced, not left behind.
    assert!(
        wizard
            .conversation()
            .messages()
            .iter()
            .all(|m| m.role != MessageRole::System)
    );

    wizard.select_option(ChatOption::ViewAlternate).await;
    let last = wizard.conversation().last().expect("alternate message");
    assert_eq!(last.recommendation.as_ref().map(|r| r.id.as_str()), Some("r2"));
    assert_eq!(backend.generate_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_data_falls_back_to_local_recommendation() {
    let backend = Backend::new("access-1");
    let base_url = spawn_backend(backend.clone()).await;
    let client = logged_in_client(base_url, "access-1").await;
    let mut wizard = ChatWizard::new(client.api.clone());

    wizard.submit_text("퇴비").await;
    wizard.submit_text("콜롬비아").await;

    let last = wizard.conversation().last().expect("result message");
    assert_eq!(last.recommendation.as_ref().map(|r| r.id.as_str()), Some("fallback"));
    assert_eq!(last.options, vec![ChatOption::GenerateAnother, ChatOption::Restart]);
    assert!(matches!(wizard.state(), WizardState::Ready { .. }));
}

#[tokio::test]
async fn expired_token_during_generation_is_refreshed_transparently() {
    let backend = Backend::new(RENEWED_TOKEN);
    backend.set_generate_reply(Some(json!({
        "recommendation": recommendation("r1", "커피박 방향제"),
        "alternatives": []
    })));
    let base_url = spawn_backend(backend.clone()).await;
    let client = logged_in_client(base_url, "access-1").await;
    let mut wizard = ChatWizard::new(client.api.clone());

    wizard.submit_text("fragrance").await;
    wizard.submit_text("Ethiopia").await;

    let last = wizard.conversation().last().expect("result message");
    assert_eq!(last.recommendation.as_ref().map(|r| r.id.as_str()), Some("r1"));
    assert_eq!(last.options, vec![ChatOption::GenerateAnother, ChatOption::Restart]);
    assert_eq!(backend.refresh_calls(), 1);
}
