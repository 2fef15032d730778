use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::domain::conversation::Message;
use crate::domain::entities::PickupStatus;
use crate::domain::errors::ApiError;
use crate::domain::ports::{Navigator, Notification, Notifier};
use crate::domain::routes::Route;
use crate::domain::session::Role;
use crate::domain::text::Text;
use crate::frameworks::config::Config;
use crate::interface_adapters::api::MarketplaceApi;
use crate::interface_adapters::http::ReqwestTransport;
use crate::interface_adapters::i18n::Translator;
use crate::interface_adapters::state::{AppState, ConsoleNotifier, ShellNavigator};
use crate::interface_adapters::storage::FileStorage;
use crate::use_cases::auth::{AuthService, RegisterForm};
use crate::use_cases::client::ApiClient;
use crate::use_cases::pages::{
    CafeDashboard, CafeDetail, GroundsForm, MarketplacePage, PickupForm, UserDashboard,
    load_map_markers,
};
use crate::use_cases::wizard::ChatWizard;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so they never interleave with page output.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return;
        }
    };
    tracing::debug!(api_base_url = %config.api_base_url, "api client configured.");

    let state = match build_state(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to start client");
            return;
        }
    };

    let mut shell = Shell::new(state);
    shell.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                break;
            }
        };
        if !shell.handle(line.trim()).await {
            break;
        }
    }
}

fn build_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let transport = Arc::new(ReqwestTransport::new(
        config.api_base_url.clone(),
        config.request_timeout,
    )?);
    let storage = Arc::new(FileStorage::new(config.storage_dir.clone()));
    let navigator = Arc::new(ShellNavigator::default());
    let client = Arc::new(ApiClient::new(transport, storage, navigator.clone()));
    let translator = Arc::new(Translator::new(config.locale)?);

    Ok(AppState {
        api: MarketplaceApi::new(client.clone()),
        auth: AuthService::new(client),
        navigator,
        notifier: Arc::new(ConsoleNotifier::new(translator.clone())),
        translator,
    })
}

// Line-oriented front end; each command maps onto a page action.
struct Shell {
    state: AppState,
    wizard: ChatWizard<MarketplaceApi>,
    cafe_dashboard: Option<CafeDashboard>,
    user_dashboard: Option<UserDashboard>,
    rendered: Option<Route>,
}

impl Shell {
    fn new(state: AppState) -> Self {
        let wizard = ChatWizard::new(state.api.clone());
        Self {
            state,
            wizard,
            cafe_dashboard: None,
            user_dashboard: None,
            rendered: None,
        }
    }

    async fn start(&mut self) {
        println!("{}", self.state.translator.t("app.welcome"));
        println!("{}", self.state.translator.t("app.help"));
        match self.state.auth.restore().await {
            Ok(Some(session)) => {
                self.say_t_with("auth.logged_in", &[("name", session.display_name.as_str())]);
                self.state.navigator.navigate(session.role.home_route());
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not restore session"),
        }
        self.render_if_moved().await;
    }

    // Returns false when the shell should exit.
    async fn handle(&mut self, line: &str) -> bool {
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "" => {}
            "quit" | "exit" => return false,
            "help" => println!("{}", self.state.translator.t("app.help")),
            "go" => self.go(Route::parse(rest)).await,
            "login" => {
                let mut args = rest.split_whitespace();
                let (email, password) = (args.next().unwrap_or(""), args.next().unwrap_or(""));
                let result = self.state.auth.login(email, password).await;
                self.report_login(result);
            }
            "google" => {
                let result = self.state.auth.login_google(rest).await;
                self.report_login(result);
            }
            "register" => self.register(rest).await,
            "logout" => {
                if let Err(e) = self.state.auth.logout().await {
                    self.notify_error(&e);
                }
                self.cafe_dashboard = None;
                self.user_dashboard = None;
                self.say_t("auth.logged_out");
            }
            "whoami" => match self.state.auth.current().await {
                Ok(Some(session)) => println!("{} <{}> ({:?})", session.display_name, session.email, session.role),
                Ok(None) => self.say_t("app.login_required"),
                Err(e) => self.notify_error(&e),
            },
            "chat" => {
                let before = self.wizard.conversation().len();
                self.wizard.submit_text(rest).await;
                let added = self.wizard.conversation().len().saturating_sub(before);
                self.print_new_messages(added);
            }
            "pick" => self.pick(rest).await,
            "chat-reset" => {
                self.wizard.reset();
                self.print_conversation();
            }
            "status" => self.update_status(rest).await,
            "grounds" => self.grounds(rest).await,
            "pickup" => self.schedule_pickup(rest).await,
            other => println!("? {other}"),
        }
        self.render_if_moved().await;
        true
    }

    async fn go(&mut self, route: Route) {
        let role = match self.state.auth.current().await {
            Ok(session) => session.map(|s| s.role),
            Err(e) => {
                self.notify_error(&e);
                None
            }
        };
        let target = route.clone().guard(role);
        if target != route {
            self.say_t("app.login_required");
        }
        self.state.navigator.navigate(target);
        // Revisiting the same page reloads it.
        self.rendered = None;
    }

    async fn render_if_moved(&mut self) {
        let route = self.state.navigator.current();
        if self.rendered.as_ref() == Some(&route) {
            return;
        }
        self.rendered = Some(route.clone());
        self.render(route).await;
    }

    async fn render(&mut self, route: Route) {
        let api = &self.state.api;
        let notifier = self.state.notifier.as_ref();
        println!("== {}", route.path());
        match route {
            Route::Home => println!("{}", self.state.translator.t("app.title")),
            Route::Login => println!("login <email> <password> | google <id-token>"),
            Route::Register => println!(
                "register user <email> <password> <name> | register cafe <email> <password> <name> <cafe-name> <address>"
            ),
            Route::Map => {
                for marker in load_map_markers(api, notifier).await {
                    println!(
                        "  {} {} ({:.5}, {:.5}) {}",
                        marker.cafe_id, marker.name, marker.latitude, marker.longitude, marker.address
                    );
                }
            }
            Route::Marketplace => {
                let page = MarketplacePage::load(api, notifier).await;
                for batch in &page.grounds {
                    println!("  [grounds] {} cafe={} {}kg", batch.id, batch.cafe_id, batch.amount_kg);
                }
                for bean in &page.beans {
                    println!("  [bean] {} {} ({})", bean.id, bean.name, bean.origin);
                }
            }
            Route::Solutions => {
                println!("{}", self.state.translator.t("chat.title"));
                self.print_conversation();
            }
            Route::CafeDashboard => {
                let dashboard = CafeDashboard::load(api, notifier).await;
                if let Some(cafe) = &dashboard.cafe {
                    println!("  {} - {}", cafe.name, cafe.address);
                }
                for batch in &dashboard.grounds {
                    println!("  [grounds] {} {}kg", batch.id, batch.amount_kg);
                }
                self.print_pickups(&dashboard.pickups.pickups);
                self.cafe_dashboard = Some(dashboard);
            }
            Route::UserDashboard => {
                let dashboard = UserDashboard::load(api, notifier).await;
                self.print_pickups(&dashboard.pickups.pickups);
                self.user_dashboard = Some(dashboard);
            }
            Route::CafeDetail(id) => {
                if let Some(detail) = CafeDetail::load(api, notifier, &id).await {
                    println!("  {} - {}", detail.cafe.name, detail.cafe.address);
                    for batch in &detail.grounds {
                        println!("  [grounds] {} {}kg", batch.id, batch.amount_kg);
                    }
                }
            }
            Route::NotFound(_) => println!("{}", self.state.translator.t("app.not_found")),
        }
    }

    async fn register(&mut self, rest: &str) {
        let args: Vec<&str> = rest.split_whitespace().collect();
        let role = match args.first().copied() {
            Some("cafe") => Role::Cafe,
            _ => Role::User,
        };
        let arg = |i: usize| args.get(i).map(|s| s.to_string()).unwrap_or_default();
        let form = RegisterForm {
            email: arg(1),
            password: arg(2),
            password_confirm: arg(2),
            display_name: arg(3),
            role,
            cafe_name: args.get(4).map(|s| s.to_string()),
            address: (args.len() > 5).then(|| args[5..].join(" ")),
        };
        if let Err(e) = self.state.auth.register(&form).await {
            self.notify_error(&e);
        }
    }

    async fn pick(&mut self, rest: &str) {
        let options = self
            .wizard
            .conversation()
            .last()
            .map(|m| m.options.clone())
            .unwrap_or_default();
        let chosen = rest
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i).copied());
        match chosen {
            Some(option) => {
                let before = self.wizard.conversation().len();
                self.wizard.select_option(option).await;
                let added = self.wizard.conversation().len().saturating_sub(before);
                self.print_new_messages(added.max(1));
            }
            None => println!("? {rest}"),
        }
    }

    async fn update_status(&mut self, rest: &str) {
        let mut args = rest.split_whitespace();
        let (Some(id), Some(status)) = (args.next(), args.next().and_then(PickupStatus::parse)) else {
            println!("status <pickup-id> <pending|accepted|rejected|completed>");
            return;
        };
        let api = &self.state.api;
        let notifier = self.state.notifier.as_ref();
        let board = match (&mut self.cafe_dashboard, &mut self.user_dashboard) {
            (Some(dashboard), _) => &mut dashboard.pickups,
            (None, Some(dashboard)) => &mut dashboard.pickups,
            (None, None) => {
                println!("go /cafe/dashboard | go /user/dashboard");
                return;
            }
        };
        // Errors are already surfaced as notifications by the board.
        let _ = board.update_status(api, notifier, id, status).await;
        if let Some(pickup) = board.get(id) {
            let key = format!("pickup.status.{}", pickup.status.as_str());
            println!("  {} → {}", pickup.id, self.state.translator.t(&key));
        }
    }

    async fn grounds(&mut self, rest: &str) {
        let Some(dashboard) = self.cafe_dashboard.as_mut() else {
            self.say_t("app.login_required");
            return;
        };
        let api = &self.state.api;
        let notifier = self.state.notifier.as_ref();
        let mut args = rest.split_whitespace();
        let result = match args.next() {
            Some("add") => {
                let form = GroundsForm {
                    amount_kg: args.next().unwrap_or_default().to_string(),
                    bean_origin: args.collect::<Vec<_>>().join(" "),
                    ..GroundsForm::default()
                };
                dashboard.register_grounds(api, notifier, &form).await.map(|_| ())
            }
            Some("rm") => match args.next() {
                Some(id) => dashboard.delete_grounds(api, notifier, id).await,
                None => Ok(()),
            },
            _ => {
                println!("grounds add <kg> [origin] | grounds rm <id>");
                Ok(())
            }
        };
        if let Err(ApiError::Validation(errors)) = result {
            for (field, message) in errors.iter() {
                println!("  {field}: {message}");
            }
        }
    }

    async fn schedule_pickup(&mut self, rest: &str) {
        let mut args = rest.split_whitespace();
        let form = PickupForm {
            cafe_id: args.next().unwrap_or_default().to_string(),
            scheduled_at: args.next().unwrap_or_default().to_string(),
            amount_kg: args.next().unwrap_or_default().to_string(),
            ..PickupForm::default()
        };
        let dashboard = self.user_dashboard.get_or_insert_with(UserDashboard::default);
        let result = dashboard
            .schedule_pickup(&self.state.api, self.state.notifier.as_ref(), &form)
            .await;
        if let Err(ApiError::Validation(errors)) = result {
            for (field, message) in errors.iter() {
                println!("  {field}: {message}");
            }
        }
    }

    fn report_login(&self, result: Result<crate::domain::session::Session, ApiError>) {
        match result {
            Ok(session) => self.say_t_with("auth.logged_in", &[("name", session.display_name.as_str())]),
            Err(ApiError::Validation(errors)) => {
                for (field, message) in errors.iter() {
                    println!("  {field}: {message}");
                }
            }
            Err(e) => self.notify_error(&e),
        }
    }

    fn print_pickups(&self, pickups: &[crate::domain::entities::Pickup]) {
        for pickup in pickups {
            let key = format!("pickup.status.{}", pickup.status.as_str());
            println!(
                "  [pickup] {} cafe={} at {} - {}",
                pickup.id,
                pickup.cafe_id,
                pickup.scheduled_at,
                self.state.translator.t(&key)
            );
        }
    }

    fn print_conversation(&self) {
        for message in self.wizard.conversation().messages() {
            self.print_message(message);
        }
    }

    fn print_new_messages(&self, count: usize) {
        let messages = self.wizard.conversation().messages();
        let start = messages.len().saturating_sub(count);
        for message in &messages[start..] {
            self.print_message(message);
        }
    }

    fn print_message(&self, message: &Message) {
        println!("{:?}> {}", message.role, self.state.translator.render(&message.text));
        if let Some(rec) = &message.recommendation {
            println!("    {} ({}, {})", rec.title, rec.difficulty, rec.duration);
            for (i, step) in rec.steps.iter().enumerate() {
                println!("    {}. {step}", i + 1);
            }
        }
        for (i, option) in message.options.iter().enumerate() {
            println!("    [{}] {}", i + 1, self.state.translator.t(option.label_key()));
        }
    }

    fn say_t(&self, key: &str) {
        println!("{}", self.state.translator.t(key));
    }

    fn say_t_with(&self, key: &str, args: &[(&str, &str)]) {
        println!("{}", self.state.translator.t_with(key, args));
    }

    fn notify_error(&self, err: &ApiError) {
        let text = match err {
            ApiError::SessionExpired => Text::key("auth.session_expired"),
            other => Text::key("app.error").with_arg("message", other.to_string()),
        };
        self.state.notifier.notify(Notification::error(text));
    }
}
