//! Light/dark preference.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mirrorcraft_core::Theme;

use crate::storage::{self, SharedStore, keys};

/// The persisted theme of one session.
#[derive(Clone)]
pub struct ThemeState {
    inner: Arc<ThemeInner>,
}

struct ThemeInner {
    current: Mutex<Theme>,
    store: SharedStore,
}

impl ThemeState {
    /// Restore from the `theme` snapshot, defaulting to light.
    #[must_use]
    pub fn load(store: SharedStore) -> Self {
        let current: Theme = storage::load_or_default(store.as_ref(), keys::THEME);
        Self {
            inner: Arc::new(ThemeInner {
                current: Mutex::new(current),
                store,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Theme> {
        self.inner.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active theme.
    #[must_use]
    pub fn current(&self) -> Theme {
        *self.lock()
    }

    /// Switch to `theme`.
    pub fn set(&self, theme: Theme) {
        let mut current = self.lock();
        *current = theme;
        storage::persist(self.inner.store.as_ref(), keys::THEME, &theme);
    }

    /// Flip between light and dark. Returns the new theme.
    pub fn toggle(&self) -> Theme {
        let mut current = self.lock();
        *current = current.toggled();
        storage::persist(self.inner.store.as_ref(), keys::THEME, &*current);
        *current
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    #[test]
    fn test_toggle_persists() {
        let store = Arc::new(MemoryStore::new());
        let theme = ThemeState::load(store.clone());
        assert_eq!(theme.current(), Theme::Light);

        assert_eq!(theme.toggle(), Theme::Dark);
        assert_eq!(store.read(keys::THEME).unwrap().as_deref(), Some("\"dark\""));

        let reloaded = ThemeState::load(store);
        assert_eq!(reloaded.current(), Theme::Dark);
    }

    #[test]
    fn test_set() {
        let store = Arc::new(MemoryStore::new());
        let theme = ThemeState::load(store);
        theme.set(Theme::Dark);
        theme.set(Theme::Light);
        assert_eq!(theme.current(), Theme::Light);
    }
}
