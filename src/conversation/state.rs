//! Interview phase machine and per-session conversation state.
//!
//! [`Phase`] only ever moves forward:
//!
//! ```text
//! Initial ──first successful turn──▶ Evaluation ──step == total──▶ Complete
//! Initial ──single-step interview──────────────────────────────────▶ Complete
//! ```
//!
//! Failed turns leave everything as it was.

use super::message::{ConversationHistory, Message};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Phase of the spoken interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Phase {
    /// Welcome prompt spoken; waiting for the self-introduction.
    #[default]
    Initial,
    /// Scripted questions are being answered and evaluated.
    Evaluation,
    /// Final report delivered. Terminal.
    Complete,
}

impl Phase {
    /// Returns `true` while transcripts are still accepted.
    ///
    /// ```
    /// use speak_eval::conversation::Phase;
    ///
    /// assert!(Phase::Initial.accepts_transcripts());
    /// assert!(Phase::Evaluation.accepts_transcripts());
    /// assert!(!Phase::Complete.accepts_transcripts());
    /// ```
    pub fn accepts_transcripts(self) -> bool {
        self != Phase::Complete
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Initial => "Introduction",
            Phase::Evaluation => "Evaluation",
            Phase::Complete => "Complete",
        }
    }
}

// ---------------------------------------------------------------------------
// ConversationState
// ---------------------------------------------------------------------------

/// Everything the controller knows about the running session.
///
/// Created at session start and dropped with the controller; nothing is
/// persisted.
#[derive(Debug, Clone)]
pub struct ConversationState {
    phase: Phase,
    step: u32,
    total_steps: u32,
    history: ConversationHistory,
    /// Prompt the candidate is currently answering (welcome or a scripted
    /// question). Named in the system prompt, not stored in `history`.
    current_question: Option<String>,
}

impl ConversationState {
    /// New session with `total_steps` turns (at least one).
    pub fn new(total_steps: u32) -> Self {
        Self {
            phase: Phase::Initial,
            step: 0,
            total_steps: total_steps.max(1),
            history: ConversationHistory::new(),
            current_question: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of successfully evaluated turns.
    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn current_question(&self) -> Option<&str> {
        self.current_question.as_deref()
    }

    pub fn set_current_question(&mut self, question: impl Into<String>) {
        self.current_question = Some(question.into());
    }

    /// 1-based number of the turn the next transcript answers.
    pub fn next_turn(&self) -> u32 {
        (self.step + 1).min(self.total_steps)
    }

    /// Returns `true` when the next successful turn ends the interview.
    pub fn next_turn_is_last(&self) -> bool {
        self.step + 1 >= self.total_steps
    }

    /// Interview progress, capped at 100.
    ///
    /// ```
    /// use speak_eval::conversation::ConversationState;
    ///
    /// let state = ConversationState::new(5);
    /// assert_eq!(state.progress_percent(), 0);
    /// ```
    pub fn progress_percent(&self) -> u8 {
        let percent = (u64::from(self.step) * 100) / u64::from(self.total_steps);
        percent.min(100) as u8
    }

    /// Commit one successful turn: append the pair, advance the step and
    /// move the phase forward.
    ///
    /// Ignored once the session is complete.
    pub fn record_turn(&mut self, user: Message, assistant: Message) {
        if !self.phase.accepts_transcripts() {
            log::warn!("conversation: turn recorded after completion ignored");
            return;
        }

        self.history.push(user);
        self.history.push(assistant);
        self.step += 1;

        let next = if self.step >= self.total_steps {
            Phase::Complete
        } else {
            Phase::Evaluation
        };
        self.advance(next);
    }

    fn advance(&mut self, next: Phase) {
        if next > self.phase {
            log::debug!(
                "conversation: {} → {}",
                self.phase.label(),
                next.label()
            );
            self.phase = next;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
