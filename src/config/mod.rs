//! Configuration module for SpeakEval.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, TOML persistence via
//! `AppConfig::load` / `AppConfig::save`, and the theme [`PreferenceStore`].

pub mod paths;
pub mod preferences;
pub mod settings;

pub use paths::AppPaths;
pub use preferences::{
    new_shared_preferences, PreferenceError, PreferenceStore, Preferences, SharedPreferences,
    Theme, TomlPreferenceStore,
};
pub use settings::{AppConfig, InterviewConfig, PlaybackConfig, PromptConfig, RelayConfig};
