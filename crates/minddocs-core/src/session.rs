//! Session context: the bearer token and the theme flag.
//!
//! One `Session` is built at startup and handed to everything that needs
//! either value. Nothing else reads the storage directly.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::storage::KeyValueStore;

const TOKEN_KEY: &str = "access_token";
const THEME_KEY: &str = "theme";

/// Credential holder. No expiry tracking and no refresh: a rejected token
/// stays stored until the user logs out or logs in again.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn get(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.get().is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Clone)]
pub struct Session {
    tokens: TokenStore,
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("tokens", &self.tokens)
            .field("theme", &self.theme())
            .finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            tokens: TokenStore::new(store.clone()),
            store,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.get().is_some()
    }

    pub fn login(&self, token: &str) -> Result<()> {
        self.tokens.save(token)?;
        info!("session token stored");
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.tokens.clear()?;
        info!("session token cleared");
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.store
            .get(THEME_KEY)
            .and_then(|t| Theme::parse(&t))
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme().toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session() -> Session {
        Session::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_token_save_get_clear() {
        let session = session();
        assert!(!session.is_authenticated());
        assert_eq!(session.tokens().get(), None);

        session.login("jwt-123").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.tokens().get().as_deref(), Some("jwt-123"));

        session.logout().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_absent() {
        let session = session();
        session.tokens().save("").unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clones_share_storage() {
        let a = session();
        let b = a.clone();
        a.login("t").unwrap();
        assert_eq!(b.tokens().get().as_deref(), Some("t"));
    }

    #[test]
    fn test_theme_defaults_to_dark_and_toggles() {
        let session = session();
        assert_eq!(session.theme(), Theme::Dark);
        assert_eq!(session.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(session.theme(), Theme::Light);
        assert_eq!(session.toggle_theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn test_unknown_theme_value_falls_back() {
        let store = Arc::new(MemoryStore::new());
        store.set("theme", "solarized").unwrap();
        assert_eq!(Session::new(store).theme(), Theme::Dark);
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let session = session();
        session.login("secret-token").unwrap();
        let printed = format!("{:?}", session.tokens());
        assert!(!printed.contains("secret-token"));
    }
}
