//! Core `RelayClient` trait and `HttpRelayClient` implementation.
//!
//! `HttpRelayClient` talks to the two relays configured in [`RelayConfig`]:
//! the evaluation relay (chat completion behind it) and the speech relay
//! (text-to-speech behind it). Provider keys live in the relays, so requests
//! carry no credentials.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::RelayConfig;
use crate::conversation::Message;
use crate::relay::voice::Voice;
use crate::relay::wire::{
    interpret_evaluation, interpret_speech, validate_speech_text, EvaluationRequest,
    SpeechRequest, VOICE_USED_HEADER,
};

// ---------------------------------------------------------------------------
// RelayError
// ---------------------------------------------------------------------------

/// Errors that can occur while calling either relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Speech text was empty; no request was sent.
    #[error("speech text is empty")]
    EmptyText,

    /// Speech text exceeds the relay limit; no request was sent.
    #[error("text too long ({len} units, max {max})")]
    TextTooLong { len: usize, max: usize },

    /// The relay refused the request (4xx). Never retried automatically.
    #[error("relay rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The relay or the provider behind it failed (5xx).
    #[error("relay failed ({status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("relay request timed out")]
    Timeout,

    /// A success response could not be parsed as expected JSON.
    #[error("failed to parse relay response: {0}")]
    Parse(String),

    /// A success response carried no textual `message`.
    #[error("relay response has no message")]
    MissingMessage,

    /// A success response from the speech relay carried no audio.
    #[error("relay returned no audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::Timeout
        } else {
            RelayError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Reply of the evaluation relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Spoken acknowledgment, or the report on the final turn.
    pub message: String,
    /// The relay's own opinion on whether this was the last turn.
    pub is_final: bool,
}

/// MP3 audio returned by the speech relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    /// Voice the relay actually used (`X-Voice-Used`), or the requested one.
    pub voice: Voice,
}

// ---------------------------------------------------------------------------
// RelayClient trait
// ---------------------------------------------------------------------------

/// Async request/response access to the evaluation and speech relays.
///
/// Implementors must be `Send + Sync` so they can be shared between the
/// controller and the playback task behind an `Arc<dyn RelayClient>`.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Send the conversation so far, tagged with the turn being answered.
    async fn evaluate(
        &self,
        messages: &[Message],
        step: u32,
        total_steps: u32,
    ) -> Result<Evaluation, RelayError>;

    /// Turn `text` into speech. Unknown `voice` names fall back to `nova`.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesizedAudio, RelayError>;
}

// ---------------------------------------------------------------------------
// HttpRelayClient
// ---------------------------------------------------------------------------

/// Calls the evaluation and speech relays over HTTP.
pub struct HttpRelayClient {
    client: reqwest::Client,
    evaluate_url: String,
    speak_url: String,
}

impl HttpRelayClient {
    /// Build a client from relay config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is used if the builder fails.
    pub fn from_config(config: &RelayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            evaluate_url: config.evaluate_url(),
            speak_url: config.speak_url(),
        }
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn evaluate(
        &self,
        messages: &[Message],
        step: u32,
        total_steps: u32,
    ) -> Result<Evaluation, RelayError> {
        let body = EvaluationRequest {
            messages,
            evaluation_step: step,
            total_steps,
        };

        log::debug!(
            "relay: evaluate step {step}/{total_steps} ({} messages)",
            messages.len()
        );

        let response = self.client.post(&self.evaluate_url).json(&body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        interpret_evaluation(status, &bytes)
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesizedAudio, RelayError> {
        validate_speech_text(text)?;
        let voice = Voice::resolve(voice);

        let response = self
            .client
            .post(&self.speak_url)
            .json(&SpeechRequest { text, voice })
            .send()
            .await?;

        let status = response.status();
        let voice_used = response
            .headers()
            .get(VOICE_USED_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        interpret_speech(status, voice_used.as_deref(), voice, bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
