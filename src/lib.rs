//! SpeakEval: a console client for spoken-English assessment interviews.
//!
//! The crate sequences a fixed-length interview against two server-side
//! relays (evaluation and speech synthesis) and plays every spoken reply
//! one at a time.
//!
//! * [`conversation`]: state machine and controller.
//! * [`relay`]: HTTP client for both relays.
//! * [`playback`]: single-utterance playback queue.
//! * [`capture`]: transcript sources.
//! * [`config`]: settings and theme preference.
//! * [`events`] / [`ui`]: session events and the console view.

pub mod capture;
pub mod config;
pub mod conversation;
pub mod events;
pub mod playback;
pub mod relay;
pub mod ui;
