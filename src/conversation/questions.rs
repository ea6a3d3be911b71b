//! Scripted interview prompts.
//!
//! Turn 1 is the free-form introduction asked by [`WELCOME`]; turns 2… answer
//! the follow-up questions, so a five-turn interview uses four of them.

use crate::config::InterviewConfig;

pub const WELCOME: &str = "Hello! I'm SpeakEval Pro. Let's begin your English evaluation. \
Please introduce yourself (your name, background, and experience).";

pub const DEFAULT_QUESTIONS: [&str; 4] = [
    "Now, please describe your current or most recent job responsibilities.",
    "Next, tell me about a professional challenge you faced.",
    "Please share your future career goals.",
    "Finally, discuss a current trend in your industry.",
];

pub const DEFAULT_FALLBACK_QUESTION: &str = "Please continue.";

/// Ordered follow-up questions with a fallback for out-of-range turns.
#[derive(Debug, Clone)]
pub struct ScriptedQuestions {
    welcome: String,
    questions: Vec<String>,
    fallback: String,
}

impl ScriptedQuestions {
    pub fn from_config(config: &InterviewConfig) -> Self {
        Self {
            welcome: config.welcome.clone(),
            questions: config.questions.clone(),
            fallback: config.fallback_question.clone(),
        }
    }

    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    /// Question asked after `completed_steps` turns, i.e.
    /// `questions[completed_steps - 1]`, or the fallback when out of range.
    pub fn follow_up(&self, completed_steps: u32) -> &str {
        completed_steps
            .checked_sub(1)
            .and_then(|i| self.questions.get(i as usize))
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

impl Default for ScriptedQuestions {
    fn default() -> Self {
        Self::from_config(&InterviewConfig::default())
    }
}
