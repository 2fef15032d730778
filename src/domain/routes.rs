use crate::domain::session::Role;

// Pages reachable through the routing shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Map,
    Marketplace,
    Solutions,
    CafeDashboard,
    UserDashboard,
    CafeDetail(String),
    NotFound(String),
}

impl Route {
    // Map a URL path onto a page; anything unknown falls through to NotFound.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let path = trimmed.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');

        match path {
            "" => Route::Home,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/map" => Route::Map,
            "/marketplace" => Route::Marketplace,
            "/solutions" => Route::Solutions,
            "/cafe/dashboard" => Route::CafeDashboard,
            "/user/dashboard" => Route::UserDashboard,
            _ => match path.strip_prefix("/cafes/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::CafeDetail(id.to_string()),
                _ => Route::NotFound(trimmed.to_string()),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Map => "/map".to_string(),
            Route::Marketplace => "/marketplace".to_string(),
            Route::Solutions => "/solutions".to_string(),
            Route::CafeDashboard => "/cafe/dashboard".to_string(),
            Route::UserDashboard => "/user/dashboard".to_string(),
            Route::CafeDetail(id) => format!("/cafes/{id}"),
            Route::NotFound(path) => path.clone(),
        }
    }

    // Dashboards are gated on the matching account kind.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::CafeDashboard => Some(Role::Cafe),
            Route::UserDashboard => Some(Role::User),
            _ => None,
        }
    }

    // Where navigation actually lands for a visitor with the given role.
    pub fn guard(self, role: Option<Role>) -> Self {
        match self.required_role() {
            Some(required) if role != Some(required) => Route::Login,
            _ => self,
        }
    }
}
