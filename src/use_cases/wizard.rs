use crate::domain::conversation::{ChatOption, Conversation, Message, greeting};
use crate::domain::entities::{GeneratedRecommendations, Recommendation};
use crate::domain::errors::ApiError;
use crate::domain::ports::RecommendationSource;
use crate::domain::text::Text;
use crate::domain::wizard::{Outcome, WizardEvent, WizardState};

pub const LOADING_KEY: &str = "chat.loading";
pub const MATERIAL_PROMPT_KEY: &str = "chat.material_prompt";
pub const FAILURE_KEY: &str = "chat.failed";
pub const RESULT_KEY: &str = "chat.result";

// Guided chat collecting purpose and material, then asking for a recommendation.
pub struct ChatWizard<G> {
    source: G,
    state: WizardState,
    conversation: Conversation,
}

impl<G> ChatWizard<G>
where
    G: RecommendationSource,
{
    pub fn new(source: G) -> Self {
        Self {
            source,
            state: WizardState::AskingPurpose,
            conversation: Conversation::new(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    // Free-text input from the chat box. Blank input is ignored.
    pub async fn submit_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.conversation.push(Message::user(text));
        self.apply(WizardEvent::Text(text.to_string())).await;
    }

    pub async fn select_option(&mut self, option: ChatOption) {
        match option {
            ChatOption::PickPurpose(purpose) => {
                // A stale purpose button clicked later in the chat does nothing.
                if self.state != WizardState::AskingPurpose {
                    tracing::debug!(state = self.state.name(), "purpose option no longer active");
                    return;
                }
                self.conversation.push(Message::user(purpose.label()));
                self.apply(WizardEvent::PickPurpose(purpose)).await;
            }
            ChatOption::ViewAlternate => self.apply(WizardEvent::ViewAlternate).await,
            ChatOption::GenerateAnother | ChatOption::Retry => {
                self.apply(WizardEvent::Regenerate).await
            }
            ChatOption::Restart => self.apply(WizardEvent::Restart).await,
        }
    }

    // Drop the whole transcript back to the greeting.
    pub fn reset(&mut self) {
        self.state = WizardState::AskingPurpose;
        self.conversation.reset();
    }

    async fn apply(&mut self, event: WizardEvent) {
        let before = self.state.name();
        let shown_before = self.state.shown_index();
        // Restarting from the purpose question would only repeat the greeting.
        let greet = matches!(event, WizardEvent::Restart) && self.state != WizardState::AskingPurpose;
        let state = std::mem::replace(&mut self.state, WizardState::AskingPurpose);
        self.state = state.on(event);
        tracing::debug!(from = before, to = self.state.name(), "wizard transition");

        match &self.state {
            WizardState::AskingPurpose if greet => {
                self.conversation.push(greeting());
            }
            WizardState::AskingMaterial { purpose } => {
                let prompt = Text::key(MATERIAL_PROMPT_KEY).with_arg("purpose", purpose.clone());
                self.conversation.push(Message::assistant(prompt));
            }
            WizardState::Generating { .. } => self.generate().await,
            WizardState::Ready { .. } => {
                if self.state.shown_index() != shown_before {
                    self.push_alternate();
                }
            }
            WizardState::AskingPurpose => {}
        }
    }

    async fn generate(&mut self) {
        let WizardState::Generating { purpose, material } = &self.state else {
            return;
        };
        let (purpose, material) = (purpose.clone(), material.clone());

        let loading = self.conversation.push(Message::system(Text::key(LOADING_KEY)));
        let result = self.source.generate(&purpose, &material).await;

        let (message, event) = match result {
            Ok(generated) => {
                let (primary, alternates) = with_fallback(generated, &purpose, &material);
                let message = result_message(&purpose, &material, &primary, !alternates.is_empty());
                (message, WizardEvent::Generated { primary, alternates })
            }
            Err(err @ (ApiError::Decode(_) | ApiError::EmptyResponse)) => {
                tracing::warn!(error = %err, "unusable recommendation reply, using fallback");
                let primary = Recommendation::fallback(&purpose, &material);
                let message = result_message(&purpose, &material, &primary, false);
                let event = WizardEvent::Generated {
                    primary,
                    alternates: Vec::new(),
                };
                (message, event)
            }
            Err(err) => {
                tracing::warn!(error = %err, "recommendation request failed");
                let message = Message::assistant(Text::key(FAILURE_KEY))
                    .with_options(vec![ChatOption::Retry, ChatOption::Restart]);
                (message, WizardEvent::GenerationFailed)
            }
        };

        self.conversation.replace(&loading, message);
        let state = std::mem::replace(&mut self.state, WizardState::AskingPurpose);
        self.state = state.on(event);
    }

    fn push_alternate(&mut self) {
        let WizardState::Ready {
            purpose,
            material,
            outcome: Outcome::Generated { alternates, .. },
        } = &self.state
        else {
            return;
        };
        let Some(shown) = self.state.shown_recommendation() else {
            return;
        };
        let message = result_message(purpose, material, shown, !alternates.is_empty());
        self.conversation.push(message);
    }
}

// Keep the first displayable result as primary; synthesize one when none is.
fn with_fallback(
    generated: GeneratedRecommendations,
    purpose: &str,
    material: &str,
) -> (Recommendation, Vec<Recommendation>) {
    let mut candidates = generated
        .primary
        .into_iter()
        .chain(generated.alternates)
        .filter(Recommendation::is_displayable);

    match candidates.next() {
        Some(primary) => (primary, candidates.collect()),
        None => {
            tracing::warn!("no displayable recommendation returned, using fallback");
            (Recommendation::fallback(purpose, material), Vec::new())
        }
    }
}

fn result_message(
    purpose: &str,
    material: &str,
    recommendation: &Recommendation,
    has_alternates: bool,
) -> Message {
    let mut options = Vec::with_capacity(3);
    if has_alternates {
        options.push(ChatOption::ViewAlternate);
    }
    options.push(ChatOption::GenerateAnother);
    options.push(ChatOption::Restart);

    let text = Text::key(RESULT_KEY)
        .with_arg("material", material)
        .with_arg("purpose", purpose)
        .with_arg("title", recommendation.title.as_str());
    Message::assistant(text)
        .with_recommendation(recommendation.clone())
        .with_options(options)
}
