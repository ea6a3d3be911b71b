//! Conversation module: the interview state machine and its controller.
//!
//! # Architecture
//!
//! ```text
//! CapturePort::next_input()             (console line, platform STT, …)
//!        │ Transcript
//!        ▼
//! ConversationController::submit_transcript()
//!        │
//!        ├─ PromptBuilder::build(turn, total, question)  → system Message
//!        ├─ RelayClient::evaluate(system + history + user, turn, total)
//!        ├─ ConversationState::record_turn(user, assistant)
//!        │      Initial → Evaluation → Complete
//!        └─ PlaybackHandle::enqueue(reply / follow-up question)
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use speak_eval::conversation::{ConversationState, Message, Phase, PromptBuilder};
//!
//! let mut state = ConversationState::new(5);
//! assert_eq!(state.phase(), Phase::Initial);
//!
//! let system = PromptBuilder::default().build(state.next_turn(), 5, "Introduce yourself.");
//! let request = state
//!     .history()
//!     .with_turn(system, Message::user("Hi, I'm Alex."));
//! assert_eq!(request.len(), 2);
//!
//! state.record_turn(Message::user("Hi, I'm Alex."), Message::assistant("Thanks, Alex!"));
//! assert_eq!(state.phase(), Phase::Evaluation);
//! assert_eq!(state.step(), 1);
//! ```

pub mod controller;
pub mod message;
pub mod prompt;
pub mod questions;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{ControllerError, ConversationController, TurnOutcome};
pub use message::{ConversationHistory, Message, Role};
pub use prompt::PromptBuilder;
pub use questions::ScriptedQuestions;
pub use state::{ConversationState, Phase};
