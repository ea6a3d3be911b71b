//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]` so a hand-edited `settings.toml` only
//! needs the keys it changes.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::conversation::prompt::{DEFAULT_EVALUATION_TEMPLATE, DEFAULT_REPORT_TEMPLATE};
use crate::conversation::questions::{DEFAULT_FALLBACK_QUESTION, DEFAULT_QUESTIONS, WELCOME};

// ---------------------------------------------------------------------------
// RelayConfig
// ---------------------------------------------------------------------------

/// Where the evaluation and speech-synthesis relays live.
///
/// Provider credentials belong to the relays; the client never sees an API
/// key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Origin both relays are served from, without a trailing slash.
    pub base_url: String,
    /// Path of the evaluation relay.
    pub evaluate_path: String,
    /// Path of the speech-synthesis relay.
    pub speak_path: String,
    /// Maximum seconds to wait for either relay before timing out.
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            evaluate_path: "/api/eval".into(),
            speak_path: "/api/speak".into(),
            timeout_secs: 30,
        }
    }
}

impl RelayConfig {
    /// Full URL of the evaluation relay.
    pub fn evaluate_url(&self) -> String {
        join_url(&self.base_url, &self.evaluate_path)
    }

    /// Full URL of the speech-synthesis relay.
    pub fn speak_url(&self) -> String {
        join_url(&self.base_url, &self.speak_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ---------------------------------------------------------------------------
// InterviewConfig
// ---------------------------------------------------------------------------

/// Shape of the spoken interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Number of answered turns before the final report is requested.
    pub total_steps: u32,
    /// Pause between the spoken acknowledgment and the next question.
    pub follow_up_delay_ms: u64,
    /// Opening prompt spoken before the first transcript.
    pub welcome: String,
    /// Scripted follow-up questions, asked after turns 1, 2, …
    pub questions: Vec<String>,
    /// Asked when the turn index runs past `questions`.
    pub fallback_question: String,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            total_steps: 5,
            follow_up_delay_ms: 1000,
            welcome: WELCOME.into(),
            questions: DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            fallback_question: DEFAULT_FALLBACK_QUESTION.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PromptConfig
// ---------------------------------------------------------------------------

/// System-prompt profile sent with every evaluation request.
///
/// Templates may use `{step}`, `{total}` and `{question}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Used for every turn except the last.
    pub evaluation_template: String,
    /// Used for the final turn; asks for the full CEFR report.
    pub report_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            evaluation_template: DEFAULT_EVALUATION_TEMPLATE.into(),
            report_template: DEFAULT_REPORT_TEMPLATE.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Spoken-audio playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Requested TTS voice. Unknown names fall back to `nova`.
    pub voice: String,
    /// Hold all synthesis until the first user interaction (browser-style
    /// autoplay policy). Console hosts can start speaking immediately.
    pub require_interaction: bool,
    /// Maximum number of utterances waiting behind the active one.
    pub queue_capacity: usize,
    /// Where synthesized MP3 files are written. `None` uses
    /// [`AppPaths::utterances_dir`].
    pub output_dir: Option<PathBuf>,
    /// External player invoked as `<command> <file.mp3>`, e.g. `mpg123 -q`.
    /// `None` only writes the files.
    pub player_command: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            voice: "nova".into(),
            require_interaction: false,
            queue_capacity: 16,
            output_dir: None,
            player_command: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use speak_eval::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Relay endpoints.
    pub relay: RelayConfig,
    /// Interview length, pacing and scripted questions.
    pub interview: InterviewConfig,
    /// System-prompt profile.
    pub prompt: PromptConfig,
    /// Playback queue and output settings.
    pub playback: PlaybackConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory synthesized utterances are written to.
    pub fn utterances_dir(&self) -> PathBuf {
        self.playback
            .output_dir
            .clone()
            .unwrap_or_else(|| AppPaths::new().utterances_dir)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
