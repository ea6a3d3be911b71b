//! Where SpeakEval keeps its files.
//!
//! | File | Platform layout (`dirs`) | `SPEAK_EVAL_HOME=<dir>` |
//! |------|--------------------------|-------------------------|
//! | `settings.toml` | config dir / `speak-eval` | `<dir>` |
//! | `preferences.toml` | config dir / `speak-eval` | `<dir>` |
//! | `utterances/*.mp3` | local data dir / `speak-eval` | `<dir>` |
//!
//! The override keeps a whole session (settings, theme, audio) in one
//! directory, e.g. on a shared classroom machine.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "speak-eval";

/// Environment variable that switches to the single-directory layout.
pub const HOME_ENV: &str = "SPEAK_EVAL_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Theme preference, written by [`TomlPreferenceStore`](super::TomlPreferenceStore).
    pub preferences_file: PathBuf,
    /// Default target of `FilePlayback` unless `playback.output_dir` is set.
    pub utterances_dir: PathBuf,
}

impl AppPaths {
    /// Resolve from `SPEAK_EVAL_HOME`, or the platform directories when it
    /// is unset or empty.
    pub fn new() -> Self {
        Self::resolve(std::env::var_os(HOME_ENV))
    }

    /// Every file under `home`.
    pub fn portable(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref();
        Self::split(home.to_path_buf(), home.to_path_buf())
    }

    fn resolve(home: Option<OsString>) -> Self {
        match home.filter(|h| !h.is_empty()) {
            Some(home) => Self::portable(PathBuf::from(home)),
            None => {
                // Minimal containers may have no platform dirs.
                let base = |dir: Option<PathBuf>| {
                    dir.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
                };
                Self::split(base(dirs::config_dir()), base(dirs::data_local_dir()))
            }
        }
    }

    fn split(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            settings_file: config_dir.join("settings.toml"),
            preferences_file: config_dir.join("preferences.toml"),
            utterances_dir: data_dir.join("utterances"),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
