//! The playback task: one utterance at a time, in request order.
//!
//! [`PlaybackQueue`] owns the [`UtteranceQueue`] and runs as its own tokio
//! task. Everyone else talks to it through a cloneable [`PlaybackHandle`].
//!
//! # Flow
//!
//! ```text
//! Enqueue(text) ──▶ UtteranceQueue ──(idle && gate open)──▶ synthesize ──▶ play
//!                        ▲                                                  │
//!                        └────────────── finish, next ◀─────────────────────┘
//! OpenGate  ──▶ synthesis allowed from now on
//! Flush(tx) ──▶ tx fires once nothing plays and nothing playable waits
//! ```
//!
//! A failed synthesis or playback surfaces a [`SessionEvent::Notice`] and
//! the queue moves on to the next utterance.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};

use crate::config::PlaybackConfig;
use crate::events::{EventSink, SessionEvent};
use crate::playback::queue::UtteranceQueue;
use crate::playback::sink::{PlaybackError, PlaybackPort};
use crate::relay::{RelayClient, RelayError};

// ---------------------------------------------------------------------------
// Commands / handle
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum PlaybackCommand {
    Enqueue(String),
    OpenGate,
    Flush(oneshot::Sender<()>),
}

/// Cheap, cloneable handle to the playback task.
///
/// The task stops once every handle is dropped, after finishing the
/// utterance that is playing at that moment.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    tx: mpsc::UnboundedSender<PlaybackCommand>,
}

impl PlaybackHandle {
    /// Schedule `text` behind everything already queued.
    pub fn enqueue(&self, text: impl Into<String>) {
        self.send(PlaybackCommand::Enqueue(text.into()));
    }

    /// Record that the user has interacted; synthesis may start.
    pub fn open_gate(&self) {
        self.send(PlaybackCommand::OpenGate);
    }

    /// Wait until nothing is playing and nothing playable is waiting.
    ///
    /// Returns immediately while the interaction gate is closed.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.send(PlaybackCommand::Flush(tx));
        let _ = rx.await;
    }

    fn send(&self, cmd: PlaybackCommand) {
        if self.tx.send(cmd).is_err() {
            log::warn!("playback: task has stopped; command dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackQueue
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum PlaybackFailure {
    Synthesis(RelayError),
    Playback(PlaybackError),
}

enum Wake {
    Finished(Result<Result<(), PlaybackFailure>, JoinError>),
    Command(Option<PlaybackCommand>),
}

/// Serialises text-to-speech playback.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use speak_eval::config::AppConfig;
/// use speak_eval::events::event_channel;
/// use speak_eval::playback::{FilePlayback, PlaybackQueue};
/// use speak_eval::relay::HttpRelayClient;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let (events, _view) = event_channel();
/// let playback = PlaybackQueue::new(
///     Arc::new(HttpRelayClient::from_config(&config.relay)),
///     Arc::new(FilePlayback::from_config(&config)),
///     &config.playback,
///     events,
/// )
/// .spawn();
///
/// playback.enqueue("Hello! Let's begin.");
/// playback.flush().await;
/// # }
/// ```
pub struct PlaybackQueue {
    relay: Arc<dyn RelayClient>,
    port: Arc<dyn PlaybackPort>,
    voice: String,
    queue: UtteranceQueue,
    gate_open: bool,
    events: EventSink,
    flush_waiters: Vec<oneshot::Sender<()>>,
}

impl PlaybackQueue {
    pub fn new(
        relay: Arc<dyn RelayClient>,
        port: Arc<dyn PlaybackPort>,
        config: &PlaybackConfig,
        events: EventSink,
    ) -> Self {
        Self {
            relay,
            port,
            voice: config.voice.clone(),
            queue: UtteranceQueue::new(config.queue_capacity),
            gate_open: !config.require_interaction,
            events,
            flush_waiters: Vec::new(),
        }
    }

    /// Spawn the playback task on the current tokio runtime.
    pub fn spawn(self) -> PlaybackHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(self.run(rx));
        PlaybackHandle { tx }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<PlaybackCommand>) {
        let mut active: Option<JoinHandle<Result<(), PlaybackFailure>>> = None;

        loop {
            if active.is_none() {
                active = self.start_next();
            }
            if active.is_none() && (self.queue.is_empty() || !self.gate_open) {
                self.release_flush_waiters();
            }

            let wake = match active.as_mut() {
                Some(task) => tokio::select! {
                    joined = task => Wake::Finished(joined),
                    cmd = rx.recv() => Wake::Command(cmd),
                },
                None => Wake::Command(rx.recv().await),
            };

            match wake {
                Wake::Finished(joined) => {
                    active = None;
                    self.finish(joined);
                }
                Wake::Command(Some(cmd)) => self.apply(cmd),
                Wake::Command(None) => {
                    if let Some(task) = active.take() {
                        let joined = task.await;
                        self.finish(joined);
                    }
                    break;
                }
            }
        }

        log::info!("playback: all handles dropped, queue shutting down");
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    fn apply(&mut self, cmd: PlaybackCommand) {
        match cmd {
            PlaybackCommand::Enqueue(text) => {
                if text.trim().is_empty() {
                    return;
                }
                if let Err(full) = self.queue.enqueue(text) {
                    log::warn!("playback: {full}; dropping utterance");
                    self.notice("Too many messages waiting to be spoken; one was skipped.");
                }
            }
            PlaybackCommand::OpenGate => {
                if !self.gate_open {
                    log::debug!("playback: interaction gate opened");
                    self.gate_open = true;
                }
            }
            PlaybackCommand::Flush(tx) => self.flush_waiters.push(tx),
        }
    }

    /// Start synthesising and playing the next utterance, if allowed.
    fn start_next(&mut self) -> Option<JoinHandle<Result<(), PlaybackFailure>>> {
        if !self.gate_open {
            return None;
        }
        let text = self.queue.dequeue()?;
        let _ = self.events.send(SessionEvent::Speaking(text.clone()));

        let relay = Arc::clone(&self.relay);
        let port = Arc::clone(&self.port);
        let voice = self.voice.clone();

        Some(tokio::spawn(async move {
            let audio = relay
                .synthesize(&text, &voice)
                .await
                .map_err(PlaybackFailure::Synthesis)?;
            port.play(audio).await.map_err(PlaybackFailure::Playback)
        }))
    }

    fn finish(&mut self, joined: Result<Result<(), PlaybackFailure>, JoinError>) {
        let text = self.queue.finish().unwrap_or_default();

        match joined {
            Ok(Ok(())) => log::debug!("playback: finished {:?}", text),
            Ok(Err(PlaybackFailure::Synthesis(e))) => {
                log::warn!("playback: synthesis failed: {e}");
                match e {
                    RelayError::TextTooLong { .. } | RelayError::EmptyText => {
                        self.notice(&format!("This message cannot be spoken: {e}."))
                    }
                    _ => self.notice("Voice feature unavailable. Please check connection."),
                }
            }
            Ok(Err(PlaybackFailure::Playback(e))) => {
                log::warn!("playback: playback failed: {e}");
                self.notice(&format!("Audio playback failed: {e}."));
            }
            Err(e) => {
                log::error!("playback: task panicked: {e}");
                self.notice("Audio playback failed.");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn release_flush_waiters(&mut self) {
        for waiter in self.flush_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    fn notice(&self, message: &str) {
        let _ = self.events.send(SessionEvent::Notice(message.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::events::{event_channel, EventStream};
    use crate::playback::mock::RecordingPlayback;
    use crate::relay::{ScriptedRelay, Voice};

    struct Fixture {
        handle: PlaybackHandle,
        relay: Arc<ScriptedRelay>,
        port: Arc<RecordingPlayback>,
        events: EventStream,
    }

    fn spawn_queue(config: PlaybackConfig, delay: Duration) -> Fixture {
        let relay = Arc::new(ScriptedRelay::new());
        let port = Arc::new(RecordingPlayback::new(delay));
        let (events_tx, events) = event_channel();

        let handle = PlaybackQueue::new(
            Arc::clone(&relay) as Arc<dyn RelayClient>,
            Arc::clone(&port) as Arc<dyn PlaybackPort>,
            &config,
            events_tx,
        )
        .spawn();

        Fixture {
            handle,
            relay,
            port,
            events,
        }
    }

    fn notices(events: &mut EventStream) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let SessionEvent::Notice(msg) = event {
                out.push(msg);
            }
        }
        out
    }

    #[tokio::test]
    async fn plays_in_fifo_order_one_at_a_time() {
        let f = spawn_queue(PlaybackConfig::default(), Duration::from_millis(15));

        for text in ["first", "second", "third"] {
            f.handle.enqueue(text);
        }
        f.handle.flush().await;

        assert_eq!(f.port.played(), ["first", "second", "third"]);
        assert_eq!(f.port.max_concurrent(), 1);
    }

    #[tokio::test]
    async fn enqueue_while_playing_waits_its_turn() {
        let f = spawn_queue(PlaybackConfig::default(), Duration::from_millis(20));

        f.handle.enqueue("welcome");
        tokio::time::sleep(Duration::from_millis(5)).await;
        f.handle.enqueue("question");
        f.handle.flush().await;

        assert_eq!(f.port.played(), ["welcome", "question"]);
        assert_eq!(f.port.max_concurrent(), 1);
    }

    #[tokio::test]
    async fn closed_gate_defers_synthesis_but_keeps_order() {
        let config = PlaybackConfig {
            require_interaction: true,
            ..PlaybackConfig::default()
        };
        let f = spawn_queue(config, Duration::ZERO);

        f.handle.enqueue("welcome");
        f.handle.enqueue("question");
        f.handle.flush().await;

        assert!(f.relay.synthesized_texts().is_empty());
        assert!(f.port.played().is_empty());

        f.handle.open_gate();
        f.handle.flush().await;

        assert_eq!(f.relay.synthesized_texts(), ["welcome", "question"]);
        assert_eq!(f.port.played(), ["welcome", "question"]);
    }

    #[tokio::test]
    async fn synthesis_failure_skips_only_that_utterance() {
        let mut f = spawn_queue(PlaybackConfig::default(), Duration::ZERO);
        f.relay.fail_synthesis_for("second");

        for text in ["first", "second", "third"] {
            f.handle.enqueue(text);
        }
        f.handle.flush().await;

        assert_eq!(f.port.played(), ["first", "third"]);
        assert_eq!(
            notices(&mut f.events),
            ["Voice feature unavailable. Please check connection."]
        );
    }

    #[tokio::test]
    async fn playback_failure_is_reported_and_queue_continues() {
        let mut f = spawn_queue(PlaybackConfig::default(), Duration::ZERO);
        f.port.fail_for("first");

        f.handle.enqueue("first");
        f.handle.enqueue("second");
        f.handle.flush().await;

        assert_eq!(f.port.played(), ["second"]);
        let notices = notices(&mut f.events);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with("Audio playback failed"));
    }

    #[tokio::test]
    async fn oversized_utterance_is_never_sent() {
        let mut f = spawn_queue(PlaybackConfig::default(), Duration::ZERO);

        f.handle.enqueue("x".repeat(5000));
        f.handle.enqueue("short");
        f.handle.flush().await;

        assert_eq!(f.relay.synthesized_texts(), ["short"]);
        let notices = notices(&mut f.events);
        assert!(notices[0].contains("text too long (5000 units, max 4096)"));
    }

    #[tokio::test]
    async fn unknown_voice_falls_back_to_nova() {
        let config = PlaybackConfig {
            voice: "robot".into(),
            ..PlaybackConfig::default()
        };
        let f = spawn_queue(config, Duration::ZERO);

        f.handle.enqueue("Hello");
        f.handle.flush().await;

        assert_eq!(f.relay.synthesized_voices(), [Voice::Nova]);
        assert_eq!(f.port.played(), ["Hello"]);
    }

    #[tokio::test]
    async fn overflow_drops_the_newest_utterance_with_a_notice() {
        let config = PlaybackConfig {
            queue_capacity: 1,
            require_interaction: true,
            ..PlaybackConfig::default()
        };
        let mut f = spawn_queue(config, Duration::ZERO);

        f.handle.enqueue("kept");
        f.handle.enqueue("dropped");
        f.handle.open_gate();
        f.handle.flush().await;

        assert_eq!(f.port.played(), ["kept"]);
        assert_eq!(notices(&mut f.events).len(), 1);
    }

    #[tokio::test]
    async fn blank_text_is_ignored() {
        let f = spawn_queue(PlaybackConfig::default(), Duration::ZERO);

        f.handle.enqueue("   ");
        f.handle.flush().await;

        assert!(f.relay.synthesized_texts().is_empty());
    }

    #[tokio::test]
    async fn speaking_events_follow_playback_order() {
        let mut f = spawn_queue(PlaybackConfig::default(), Duration::ZERO);

        f.handle.enqueue("a");
        f.handle.enqueue("b");
        f.handle.flush().await;

        let mut spoken = Vec::new();
        while let Ok(event) = f.events.try_recv() {
            if let SessionEvent::Speaking(text) = event {
                spoken.push(text);
            }
        }
        assert_eq!(spoken, ["a", "b"]);
    }
}
