use uuid::Uuid;

use crate::domain::entities::Recommendation;
use crate::domain::text::Text;
use crate::domain::wizard::Purpose;

pub const GREETING_KEY: &str = "chat.greeting";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

// Clickable choices attached to an assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOption {
    PickPurpose(Purpose),
    ViewAlternate,
    GenerateAnother,
    Retry,
    Restart,
}

impl ChatOption {
    // Translation key for the option label.
    pub fn label_key(self) -> &'static str {
        match self {
            ChatOption::PickPurpose(purpose) => purpose.label_key(),
            ChatOption::ViewAlternate => "chat.option.view_alternate",
            ChatOption::GenerateAnother => "chat.option.generate_another",
            ChatOption::Retry => "chat.option.retry",
            ChatOption::Restart => "chat.option.restart",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub text: Text,
    pub recommendation: Option<Recommendation>,
    pub options: Vec<ChatOption>,
}

impl Message {
    pub fn new(role: MessageRole, text: impl Into<Text>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            recommendation: None,
            options: Vec::new(),
        }
    }

    // What the user typed is shown back verbatim.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, Text::Literal(text.into()))
    }

    pub fn assistant(text: impl Into<Text>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    pub fn system(text: impl Into<Text>) -> Self {
        Self::new(MessageRole::System, text)
    }

    pub fn with_options(mut self, options: Vec<ChatOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_recommendation(mut self, recommendation: Recommendation) -> Self {
        self.recommendation = Some(recommendation);
        self
    }
}

// Append-only transcript; the only in-place edit is swapping a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![greeting()],
        }
    }

    // Returns the id of the appended message.
    pub fn push(&mut self, message: Message) -> String {
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    // Replace a message in place, keeping its position and id.
    pub fn replace(&mut self, id: &str, mut message: Message) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(slot) => {
                message.id = slot.id.clone();
                *slot = message;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(greeting());
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

pub fn greeting() -> Message {
    Message::assistant(Text::key(GREETING_KEY)).with_options(
        Purpose::ALL
            .iter()
            .copied()
            .map(ChatOption::PickPurpose)
            .collect(),
    )
}
