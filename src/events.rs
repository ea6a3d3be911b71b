//! Session events published by the controller and the playback task.
//!
//! Whatever renders the session (the console view in the binary, a test
//! harness, a web bridge) subscribes to one channel and never touches
//! controller state directly.

use tokio::sync::mpsc;

use crate::conversation::Role;

/// Progress and notices delivered to the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A message to show in the transcript pane.
    MessageAdded { role: Role, content: String },
    /// Transient system-level notice (relay, capture or playback failure).
    Notice(String),
    /// `true` while an evaluation request is in flight.
    Thinking(bool),
    /// Interview progress after a successful turn.
    Progress {
        step: u32,
        total_steps: u32,
        percent: u8,
    },
    /// Whether the user may start a capture session.
    CaptureEnabled(bool),
    /// An utterance started playing.
    Speaking(String),
    /// The interview finished; `report` is the final relay message.
    Completed { report: String },
}

/// Sending half of the session event channel.
///
/// Unbounded so that publishers never wait on a slow view.
pub type EventSink = mpsc::UnboundedSender<SessionEvent>;

/// Receiving half of the session event channel.
pub type EventStream = mpsc::UnboundedReceiver<SessionEvent>;

pub fn event_channel() -> (EventSink, EventStream) {
    mpsc::unbounded_channel()
}
