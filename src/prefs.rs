//! User preferences (theme, onboarding) persisted through a key-value store.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumString};
use tracing::warn;

const THEME_KEY: &str = "theme";
const ONBOARDING_KEY: &str = "onboarding_completed";

#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub onboarding_completed: bool,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub theme: Option<Theme>,
    pub onboarding_completed: Option<bool>,
}

#[derive(Clone)]
pub struct PreferencesService {
    store: Arc<dyn KeyValueStore>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::default()))
    }

    /// Unreadable stored values fall back to defaults.
    pub fn load(&self) -> Preferences {
        let theme = match self.store.get(THEME_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring unknown stored theme");
                Theme::default()
            }),
            None => Theme::default(),
        };
        let onboarding_completed = self
            .store
            .get(ONBOARDING_KEY)
            .map_or(false, |v| v == "true");
        Preferences {
            theme,
            onboarding_completed,
        }
    }

    pub fn update(&self, update: PreferencesUpdate) -> Preferences {
        if let Some(theme) = update.theme {
            self.store.set(THEME_KEY, theme.to_string());
        }
        if let Some(done) = update.onboarding_completed {
            self.store.set(ONBOARDING_KEY, done.to_string());
        }
        self.load()
    }

    pub fn reset(&self) {
        self.store.remove(THEME_KEY);
        self.store.remove(ONBOARDING_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn defaults_when_nothing_stored() {
        let prefs = PreferencesService::in_memory().load();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.theme, Theme::System);
    }

    #[test]
    fn update_round_trips_through_store() {
        let svc = PreferencesService::in_memory();
        let prefs = svc.update(PreferencesUpdate {
            theme: Some(Theme::Dark),
            onboarding_completed: None,
        });
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(!prefs.onboarding_completed);

        let prefs = svc.update(PreferencesUpdate {
            theme: None,
            onboarding_completed: Some(true),
        });
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.onboarding_completed);

        svc.reset();
        assert_eq!(svc.load(), Preferences::default());
    }

    #[test]
    fn writes_go_to_injected_store() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .with(eq(THEME_KEY), eq("light".to_string()))
            .times(1)
            .return_const(());
        store
            .expect_get()
            .with(eq(THEME_KEY))
            .return_const(Some("light".to_string()));
        store.expect_get().with(eq(ONBOARDING_KEY)).return_const(None::<String>);

        let svc = PreferencesService::new(Arc::new(store));
        let prefs = svc.update(PreferencesUpdate {
            theme: Some(Theme::Light),
            onboarding_completed: None,
        });
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn garbage_theme_falls_back() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .with(eq(THEME_KEY))
            .return_const(Some("neon".to_string()));
        store.expect_get().with(eq(ONBOARDING_KEY)).return_const(None::<String>);
        let prefs = PreferencesService::new(Arc::new(store)).load();
        assert_eq!(prefs.theme, Theme::System);
    }
}
