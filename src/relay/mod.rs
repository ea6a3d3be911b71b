//! Relay client module.
//!
//! This module provides:
//! * [`RelayClient`]: async trait for the evaluation and speech relays.
//! * [`HttpRelayClient`]: reqwest implementation driven by [`RelayConfig`].
//! * [`Voice`]: the fixed set of TTS voices, with `nova` as fallback.
//! * [`RelayError`]: error variants for relay calls.
//!
//! [`RelayConfig`]: crate::config::RelayConfig
//!
//! # Quick start
//!
//! ```rust,no_run
//! use speak_eval::config::AppConfig;
//! use speak_eval::conversation::Message;
//! use speak_eval::relay::{HttpRelayClient, RelayClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let relay = HttpRelayClient::from_config(&config.relay);
//!
//!     let history = vec![Message::user("Hi, I'm Alex and I write software.")];
//!     let reply = relay.evaluate(&history, 1, 5).await.unwrap();
//!     let audio = relay.synthesize(&reply.message, "nova").await.unwrap();
//!     println!("{} ({} bytes of audio)", reply.message, audio.bytes.len());
//! }
//! ```

pub mod client;
pub mod voice;
pub mod wire;

#[cfg(test)]
pub mod mock;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{Evaluation, HttpRelayClient, RelayClient, RelayError, SynthesizedAudio};
pub use voice::Voice;
pub use wire::MAX_SPEECH_UNITS;

#[cfg(test)]
pub use mock::ScriptedRelay;
