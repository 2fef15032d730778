use std::sync::{Arc, Mutex};

use crate::domain::ports::{Navigator, Notification, NotificationLevel, Notifier};
use crate::domain::routes::Route;
use crate::interface_adapters::api::MarketplaceApi;
use crate::interface_adapters::i18n::Translator;
use crate::use_cases::auth::AuthService;

// Shared collaborators handed to every page.
#[derive(Clone)]
pub struct AppState {
    pub api: MarketplaceApi,
    pub auth: AuthService,
    pub navigator: Arc<ShellNavigator>,
    pub notifier: Arc<ConsoleNotifier>,
    pub translator: Arc<Translator>,
}

// Navigator that remembers where the shell should render next.
#[derive(Debug)]
pub struct ShellNavigator {
    current: Mutex<Route>,
}

impl ShellNavigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn current(&self) -> Route {
        match self.current.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for ShellNavigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator for ShellNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(path = %route.path(), "navigate");
        let mut guard = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = route;
    }
}

// Prints toasts to the terminal in the active locale.
#[derive(Debug)]
pub struct ConsoleNotifier {
    translator: Arc<Translator>,
}

impl ConsoleNotifier {
    pub fn new(translator: Arc<Translator>) -> Self {
        Self { translator }
    }

    pub fn line(&self, notification: &Notification) -> String {
        let marker = match notification.level {
            NotificationLevel::Info => "i",
            NotificationLevel::Success => "✓",
            NotificationLevel::Error => "!",
        };
        format!("[{marker}] {}", self.translator.render(&notification.text))
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        println!("{}", self.line(&notification));
    }
}
