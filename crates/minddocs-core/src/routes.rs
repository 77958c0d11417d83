//! Route table, authentication guard and the splash timer.

use std::time::{Duration, Instant};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Upload,
    Documents,
    Chat,
    Summary,
    Translate,
    Extract,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Upload,
        Route::Documents,
        Route::Chat,
        Route::Summary,
        Route::Translate,
        Route::Extract,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/home",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Upload => "/upload",
            Route::Documents => "/documents",
            Route::Chat => "/chat",
            Route::Summary => "/summary",
            Route::Translate => "/translate",
            Route::Extract => "/extract",
        }
    }

    /// `/` is an alias of `/home`. Unknown paths resolve to nothing.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Route::Home);
        }
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Upload => "Upload",
            Route::Documents => "My Documents",
            Route::Chat => "Chat",
            Route::Summary => "Summarize",
            Route::Translate => "Translate",
            Route::Extract => "Extract",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Home | Route::Login | Route::Register)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Decide whether `route` may mount. Evaluated on every navigation.
pub fn guard(route: Route, session: &Session) -> GuardDecision {
    if route.is_public() || session.is_authenticated() {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect(Route::Login)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLink {
    Go(Route),
    Logout,
}

impl NavLink {
    pub fn label(&self) -> &'static str {
        match self {
            NavLink::Go(route) => route.title(),
            NavLink::Logout => "Logout",
        }
    }
}

pub fn nav_links(authenticated: bool) -> Vec<NavLink> {
    if authenticated {
        vec![
            NavLink::Go(Route::Home),
            NavLink::Go(Route::Upload),
            NavLink::Go(Route::Documents),
            NavLink::Go(Route::Chat),
            NavLink::Go(Route::Summary),
            NavLink::Go(Route::Translate),
            NavLink::Go(Route::Extract),
            NavLink::Logout,
        ]
    } else {
        vec![
            NavLink::Go(Route::Home),
            NavLink::Go(Route::Login),
            NavLink::Go(Route::Register),
        ]
    }
}

/// Splash overlay shown for a fixed time after every route change.
/// Restarting replaces the previous deadline.
#[derive(Debug, Clone)]
pub struct SplashTimer {
    duration: Duration,
    until: Option<Instant>,
}

impl SplashTimer {
    pub fn new(duration: Duration) -> Self {
        Self { duration, until: None }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn restart(&mut self, now: Instant) {
        self.until = Some(now + self.duration);
    }

    pub fn is_showing(&self, now: Instant) -> bool {
        self.until.map(|until| now < until).unwrap_or(false)
    }

    pub fn dismiss(&mut self) {
        self.until = None;
    }
}
