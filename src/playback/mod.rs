//! Audio playback module.
//!
//! Spoken replies go through a single playback task so that at most one
//! utterance is audible at a time.
//!
//! # Architecture
//!
//! ```text
//! PlaybackHandle::enqueue(text)   (controller, any clone)
//!        │  mpsc
//!        ▼
//! PlaybackQueue::run()  ← tokio task, owns UtteranceQueue
//!        │
//!        ├─ gate closed → hold text, keep order
//!        │
//!        └─ idle + gate open
//!              ├─ RelayClient::synthesize(text, voice)
//!              └─ PlaybackPort::play(audio)   (FilePlayback on the console)
//! ```
//!
//! This module provides:
//! * [`UtteranceQueue`]: bounded FIFO with a single active slot.
//! * [`PlaybackPort`] / [`FilePlayback`]: where synthesized audio goes.
//! * [`PlaybackQueue`] / [`PlaybackHandle`]: the task and its handle.

pub mod queue;
pub mod sink;
pub mod worker;

#[cfg(test)]
pub mod mock;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use queue::{QueueFull, UtteranceQueue};
pub use sink::{FilePlayback, PlaybackError, PlaybackPort};
pub use worker::{PlaybackHandle, PlaybackQueue};

#[cfg(test)]
pub use mock::RecordingPlayback;
