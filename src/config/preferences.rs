//! Theme preference and its persistence port.
//!
//! [`PreferenceStore`] is the injected port the console view and capture
//! adapter use to remember the user's theme between sessions.
//! [`TomlPreferenceStore`] is the file-backed implementation. The tests
//! also drive [`Preferences`] through an in-memory store that can be told
//! to fail.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Console colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

// ---------------------------------------------------------------------------
// PreferenceStore
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("cannot access preferences file: {0}")]
    Io(#[from] std::io::Error),

    #[error("preferences file is malformed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialise preferences: {0}")]
    Serialise(#[from] toml::ser::Error),
}

/// Persistence port for user preferences.
pub trait PreferenceStore: Send {
    /// Saved theme, or `None` when nothing has been saved yet.
    fn load_theme(&self) -> Result<Option<Theme>, PreferenceError>;

    fn save_theme(&mut self, theme: Theme) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferencesFile {
    theme: Option<Theme>,
}

/// Stores preferences as a small TOML file (`preferences.toml`).
#[derive(Debug, Clone)]
pub struct TomlPreferenceStore {
    path: PathBuf,
}

impl TomlPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn load_theme(&self) -> Result<Option<Theme>, PreferenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let file: PreferencesFile = toml::from_str(&content)?;
        Ok(file.theme)
    }

    fn save_theme(&mut self, theme: Theme) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&PreferencesFile { theme: Some(theme) })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Preferences / SharedPreferences
// ---------------------------------------------------------------------------

/// Current preferences plus the store they are written back to.
pub struct Preferences {
    theme: Theme,
    store: Box<dyn PreferenceStore>,
}

impl Preferences {
    /// Load the saved theme from `store`. A missing or unreadable file falls
    /// back to [`Theme::Light`].
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let theme = match store.load_theme() {
            Ok(saved) => saved.unwrap_or_default(),
            Err(e) => {
                log::warn!("could not read theme preference ({e}); using default");
                Theme::default()
            }
        };
        Self { theme, store }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch theme and persist the new value.
    ///
    /// The in-memory theme changes even when saving fails.
    pub fn toggle_theme(&mut self) -> Result<Theme, PreferenceError> {
        self.theme = self.theme.toggled();
        self.store.save_theme(self.theme)?;
        Ok(self.theme)
    }
}

/// Preferences shared between the console view and the capture adapter.
///
/// Lock for a short critical section only; never across `.await`.
pub type SharedPreferences = Arc<Mutex<Preferences>>;

pub fn new_shared_preferences(store: Box<dyn PreferenceStore>) -> SharedPreferences {
    Arc::new(Mutex::new(Preferences::load(store)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Keeps the theme in memory; `read_only` makes every save fail.
    #[derive(Default)]
    struct MemoryStore {
        saved: Arc<Mutex<Option<Theme>>>,
        read_only: bool,
    }

    impl PreferenceStore for MemoryStore {
        fn load_theme(&self) -> Result<Option<Theme>, PreferenceError> {
            Ok(*self.saved.lock().unwrap())
        }

        fn save_theme(&mut self, theme: Theme) -> Result<(), PreferenceError> {
            if self.read_only {
                return Err(PreferenceError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            *self.saved.lock().unwrap() = Some(theme);
            Ok(())
        }
    }

    #[test]
    fn toggled_flips_between_themes() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempdir().expect("temp dir");
        let store = TomlPreferenceStore::new(dir.path().join("preferences.toml"));
        assert_eq!(store.load_theme().expect("load"), None);
    }

    #[test]
    fn saved_theme_survives_reload() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("preferences.toml");

        let mut store = TomlPreferenceStore::new(&path);
        store.save_theme(Theme::Dark).expect("save");

        let reloaded = TomlPreferenceStore::new(&path);
        assert_eq!(reloaded.load_theme().expect("load"), Some(Theme::Dark));
    }

    #[test]
    fn toggle_persists_through_store() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("preferences.toml");

        let mut prefs = Preferences::load(Box::new(TomlPreferenceStore::new(&path)));
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.toggle_theme().expect("toggle"), Theme::Dark);

        let prefs = Preferences::load(Box::new(TomlPreferenceStore::new(&path)));
        assert_eq!(prefs.theme(), Theme::Dark);
    }

    #[test]
    fn malformed_file_falls_back_to_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "theme = \"sepia\"").expect("write");

        let prefs = Preferences::load(Box::new(TomlPreferenceStore::new(&path)));
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn saved_theme_is_loaded_from_the_store() {
        let store = MemoryStore::default();
        *store.saved.lock().unwrap() = Some(Theme::Dark);

        let prefs = Preferences::load(Box::new(store));
        assert_eq!(prefs.theme(), Theme::Dark);
    }

    #[test]
    fn failed_save_still_switches_theme() {
        let store = MemoryStore {
            read_only: true,
            ..MemoryStore::default()
        };
        let saved = Arc::clone(&store.saved);
        let mut prefs = Preferences::load(Box::new(store));

        assert!(matches!(prefs.toggle_theme(), Err(PreferenceError::Io(_))));
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(*saved.lock().unwrap(), None);
    }
}
