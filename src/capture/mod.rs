//! Speech capture module.
//!
//! A capture session produces exactly one finalized [`Transcript`]. The
//! controller awaits [`CapturePort::next_input`] between relay calls, so
//! only one session is ever open. Hosts with a command channel (the console)
//! may also answer a session with [`CaptureInput::Repeat`].
//!
//! This module provides:
//! * [`CapturePort`]: async trait over whatever produces transcripts.
//! * [`ConsoleCapture`]: one line of input is one transcript.
//! * [`CaptureInput`]: a transcript or a replay request.
//! * [`CaptureError`]: why a session produced no transcript.

pub mod console;

use async_trait::async_trait;
use thiserror::Error;

pub use console::ConsoleCapture;

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Non-empty text from one finalized capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript(String);

impl Transcript {
    /// Trim `text` and reject it when nothing is left.
    pub fn new(text: impl AsRef<str>) -> Result<Self, CaptureError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CaptureError::NoSpeech);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// CaptureInput
// ---------------------------------------------------------------------------

/// What one listening session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureInput {
    /// An answer to evaluate.
    Transcript(Transcript),
    /// Ask for the last examiner message to be spoken again.
    Repeat,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The session ended without any recognised speech.
    #[error("no speech detected")]
    NoSpeech,

    /// The input source has ended; no further sessions are possible.
    #[error("capture input closed")]
    Closed,

    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// CapturePort
// ---------------------------------------------------------------------------

/// Source of finalized transcripts.
#[async_trait]
pub trait CapturePort: Send {
    /// Open one capture session and wait for its final transcript.
    async fn listen_once(&mut self) -> Result<Transcript, CaptureError>;

    /// Like [`listen_once`](Self::listen_once), for sources that also take
    /// commands. Sources without commands only ever yield transcripts.
    async fn next_input(&mut self) -> Result<CaptureInput, CaptureError> {
        self.listen_once().await.map(CaptureInput::Transcript)
    }
}

// ---------------------------------------------------------------------------
// ScriptedCapture (tests)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use scripted::ScriptedCapture;
