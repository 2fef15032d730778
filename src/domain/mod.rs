// Domain layer: marketplace entities, session identity, the chat wizard and ports.

pub mod conversation;
pub mod entities;
pub mod errors;
pub mod ports;
pub mod routes;
pub mod session;
pub mod text;
pub mod wizard;

pub use conversation::{ChatOption, Conversation, Message, MessageRole};
pub use entities::{
    Bean, Cafe, CoffeeGroundBatch, GeneratedRecommendations, Pickup, PickupStatus, Recommendation,
};
pub use errors::{ApiError, ValidationErrors};
pub use ports::{
    ApiRequest, ApiResponse, HttpTransport, Method, Navigator, Notification, NotificationLevel,
    Notifier, RecommendationSource, TokenStorage,
};
pub use routes::Route;
pub use session::{Role, Session, TokenPair};
pub use text::Text;
pub use wizard::{Outcome, Purpose, WizardEvent, WizardState};
