//! Conversation controller: drives capture → evaluation → playback.
//!
//! [`ConversationController`] owns the [`ConversationState`] exclusively.
//! Views learn about progress only through [`SessionEvent`]s.
//!
//! # Turn flow
//!
//! ```text
//! start()
//!   └─▶ welcome → MessageAdded, enqueue, CaptureEnabled(true)     [Initial]
//!
//! submit_transcript(text)
//!   └─▶ MessageAdded(user), CaptureEnabled(false), Thinking(true)
//!         └─▶ relay.evaluate(system + history + user, turn, total)
//!               ├─ Err → Notice, CaptureEnabled(true)     state untouched
//!               └─ Ok  → record_turn, MessageAdded(assistant), enqueue,
//!                        Progress
//!                          ├─ last turn → Completed, CaptureEnabled(false)
//!                          └─ otherwise → delay, follow-up question,
//!                                         CaptureEnabled(true) [Evaluation]
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::capture::{CaptureError, CaptureInput, CapturePort};
use crate::config::AppConfig;
use crate::events::{EventSink, SessionEvent};
use crate::playback::PlaybackHandle;
use crate::relay::{RelayClient, RelayError};

use super::message::{Message, Role};
use super::prompt::PromptBuilder;
use super::questions::ScriptedQuestions;
use super::state::ConversationState;

const EVALUATION_NOTICE: &str = "Evaluation error. Please try again.";

// ---------------------------------------------------------------------------
// ControllerError / TurnOutcome
// ---------------------------------------------------------------------------

/// Preconditions of [`ConversationController::submit_transcript`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("the evaluation is already complete")]
    SessionComplete,

    #[error("transcript is empty")]
    EmptyTranscript,
}

/// What one submitted transcript led to.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The turn was evaluated and the interview goes on.
    Continue {
        step: u32,
        reply: String,
        next_question: String,
    },
    /// The last turn was evaluated; `report` is the final relay message.
    Complete { report: String },
    /// The relay call failed. Nothing changed; the transcript may be
    /// submitted again.
    Retry(RelayError),
}

// ---------------------------------------------------------------------------
// ConversationController
// ---------------------------------------------------------------------------

pub struct ConversationController {
    state: ConversationState,
    relay: Arc<dyn RelayClient>,
    playback: PlaybackHandle,
    capture: Box<dyn CapturePort>,
    events: EventSink,
    prompts: PromptBuilder,
    questions: ScriptedQuestions,
    follow_up_delay: Duration,
    interacted: bool,
    /// Last examiner line shown, replayed on request.
    last_spoken: Option<String>,
}

impl ConversationController {
    pub fn new(
        config: &AppConfig,
        relay: Arc<dyn RelayClient>,
        playback: PlaybackHandle,
        capture: Box<dyn CapturePort>,
        events: EventSink,
    ) -> Self {
        Self {
            state: ConversationState::new(config.interview.total_steps),
            relay,
            playback,
            capture,
            events,
            prompts: PromptBuilder::from_config(&config.prompt),
            questions: ScriptedQuestions::from_config(&config.interview),
            follow_up_delay: Duration::from_millis(config.interview.follow_up_delay_ms),
            interacted: false,
            last_spoken: None,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Speak the welcome prompt and enable capture.
    pub fn start(&mut self) {
        log::info!(
            "conversation: session started ({} turns)",
            self.state.total_steps()
        );

        let welcome = self.questions.welcome().to_string();
        self.state.set_current_question(welcome.clone());
        self.say(welcome);

        self.emit(SessionEvent::Progress {
            step: 0,
            total_steps: self.state.total_steps(),
            percent: 0,
        });
        self.emit(SessionEvent::CaptureEnabled(true));
    }

    /// Run the whole session: welcome, then one capture per turn until the
    /// interview completes or the capture input closes.
    pub async fn run(&mut self) {
        self.start();

        while self.state.phase().accepts_transcripts() {
            self.playback.flush().await;

            let transcript = match self.capture.next_input().await {
                Ok(CaptureInput::Transcript(transcript)) => transcript,
                Ok(CaptureInput::Repeat) => {
                    self.repeat_last();
                    continue;
                }
                Err(CaptureError::Closed) => {
                    log::info!("conversation: capture closed, ending session");
                    break;
                }
                Err(e) => {
                    log::warn!("conversation: capture failed: {e}");
                    self.notice(format!("Error: {e}. Please try again."));
                    self.emit(SessionEvent::CaptureEnabled(true));
                    continue;
                }
            };

            if !self.interacted {
                self.interacted = true;
                self.playback.open_gate();
            }

            if let Err(e) = self.submit_transcript(transcript.as_str()).await {
                log::warn!("conversation: transcript not submitted: {e}");
            }
        }

        self.playback.flush().await;
        log::info!(
            "conversation: session ended in {} phase at step {}/{}",
            self.state.phase().label(),
            self.state.step(),
            self.state.total_steps()
        );
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    /// Evaluate one finalized transcript.
    ///
    /// A relay failure is reported as [`TurnOutcome::Retry`] and leaves
    /// phase, step and history exactly as they were.
    pub async fn submit_transcript(&mut self, text: &str) -> Result<TurnOutcome, ControllerError> {
        if !self.state.phase().accepts_transcripts() {
            return Err(ControllerError::SessionComplete);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ControllerError::EmptyTranscript);
        }

        self.emit(SessionEvent::MessageAdded {
            role: Role::User,
            content: text.to_string(),
        });
        self.emit(SessionEvent::CaptureEnabled(false));
        self.emit(SessionEvent::Thinking(true));

        let turn = self.state.next_turn();
        let total = self.state.total_steps();
        let question = self.state.current_question().unwrap_or_default();
        let system = self.prompts.build(turn, total, question);
        let user = Message::user(text);
        let request = self.state.history().with_turn(system, user.clone());

        log::debug!("conversation: evaluating turn {turn}/{total}");
        let result = self.relay.evaluate(&request, turn, total).await;
        self.emit(SessionEvent::Thinking(false));

        let evaluation = match result {
            Ok(evaluation) => evaluation,
            Err(e) => {
                log::warn!("conversation: evaluation of turn {turn} failed: {e}");
                self.notice(EVALUATION_NOTICE.to_string());
                self.emit(SessionEvent::CaptureEnabled(true));
                return Ok(TurnOutcome::Retry(e));
            }
        };

        let is_last = self.state.next_turn_is_last();
        if evaluation.is_final != is_last {
            log::warn!(
                "conversation: relay says final={} on turn {turn}/{total}; keeping local count",
                evaluation.is_final
            );
        }

        let reply = evaluation.message;
        self.state.record_turn(user, Message::assistant(reply.clone()));
        self.say(reply.clone());
        self.emit(SessionEvent::Progress {
            step: self.state.step(),
            total_steps: total,
            percent: self.state.progress_percent(),
        });

        if !self.state.phase().accepts_transcripts() {
            log::info!("conversation: evaluation complete after {total} turns");
            self.emit(SessionEvent::Completed {
                report: reply.clone(),
            });
            self.emit(SessionEvent::CaptureEnabled(false));
            return Ok(TurnOutcome::Complete { report: reply });
        }

        if !self.follow_up_delay.is_zero() {
            tokio::time::sleep(self.follow_up_delay).await;
        }

        let step = self.state.step();
        let next_question = self.questions.follow_up(step).to_string();
        self.state.set_current_question(next_question.clone());
        self.say(next_question.clone());
        self.emit(SessionEvent::CaptureEnabled(true));

        Ok(TurnOutcome::Continue {
            step,
            reply,
            next_question,
        })
    }

    /// Queue the last examiner line for speech again.
    ///
    /// Phase, step and history are left alone. Returns the replayed text,
    /// or `None` before anything has been said.
    pub fn repeat_last(&self) -> Option<&str> {
        let text = self.last_spoken.as_deref()?;
        log::debug!("conversation: replaying {:?}", text);
        self.playback.enqueue(text);
        Some(text)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Show an assistant line and queue it for speech.
    fn say(&mut self, text: String) {
        self.emit(SessionEvent::MessageAdded {
            role: Role::Assistant,
            content: text.clone(),
        });
        self.playback.enqueue(text.clone());
        self.last_spoken = Some(text);
    }

    fn notice(&self, message: String) {
        self.emit(SessionEvent::Notice(message));
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            log::debug!("conversation: no view attached; event dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
