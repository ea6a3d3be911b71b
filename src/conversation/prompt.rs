//! System prompts for the evaluation relay.
//!
//! [`PromptBuilder`] renders the per-turn system message from the configured
//! profile. Two templates exist:
//! * **Evaluation** (every turn but the last): short feedback on five
//!   criteria, then a spoken hand-off to the next question.
//! * **Report** (the last turn): the full CEFR report.
//!
//! Placeholders: `{step}`, `{total}`, `{question}` and, in the report,
//! `{cefr}` (the level table below).

use crate::config::PromptConfig;
use crate::conversation::message::Message;

// ---------------------------------------------------------------------------
// CEFR rubric
// ---------------------------------------------------------------------------

/// One row of the CEFR rubric passed to the model as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CefrBand {
    pub level: &'static str,
    pub min: u8,
    pub max: u8,
    pub description: &'static str,
}

pub const CEFR_BANDS: [CefrBand; 6] = [
    CefrBand {
        level: "A1",
        min: 0,
        max: 20,
        description: "Basic user (beginner)",
    },
    CefrBand {
        level: "A2",
        min: 21,
        max: 40,
        description: "Basic user (elementary)",
    },
    CefrBand {
        level: "B1",
        min: 41,
        max: 60,
        description: "Independent user (intermediate)",
    },
    CefrBand {
        level: "B2",
        min: 61,
        max: 80,
        description: "Independent user (upper intermediate)",
    },
    CefrBand {
        level: "C1",
        min: 81,
        max: 90,
        description: "Proficient user (advanced)",
    },
    CefrBand {
        level: "C2",
        min: 91,
        max: 100,
        description: "Proficient user (mastery)",
    },
];

/// `A1 (0-20): Basic user (beginner)` lines, one per band.
pub fn cefr_table() -> String {
    CEFR_BANDS
        .iter()
        .map(|b| format!("{} ({}-{}): {}", b.level, b.min, b.max, b.description))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Default templates
// ---------------------------------------------------------------------------

pub const DEFAULT_EVALUATION_TEMPLATE: &str = "\
You are SpeakEval Pro evaluating English speaking skills.
This is turn {step} of {total}. The candidate is answering: \"{question}\"

Give brief spoken feedback on:
1. Pronunciation (0-10)
2. Fluency (0-10)
3. Grammar (0-10)
4. Vocabulary (0-10)
5. Comprehension (0-10)

Keep it to two or three sentences. Do not ask a new question; the next one is asked for you.";

pub const DEFAULT_REPORT_TEMPLATE: &str = "\
You are SpeakEval Pro. The candidate has answered the final question (turn {step} of {total}): \"{question}\"

Write the final evaluation report covering the whole conversation:
- Pronunciation, Fluency, Grammar, Vocabulary and Comprehension, each scored 0-10 with one line of evidence.
- An overall score from 0 to 100 and the matching CEFR level:
{cefr}
- Two concrete suggestions for improvement.

Write plain sentences suitable for reading aloud.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Renders the system message for one evaluation turn.
///
/// # Example
/// ```rust
/// use speak_eval::config::PromptConfig;
/// use speak_eval::conversation::PromptBuilder;
///
/// let builder = PromptBuilder::from_config(&PromptConfig::default());
/// let system = builder.build(2, 5, "Tell me about a challenge.");
/// assert!(system.content.contains("turn 2 of 5"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    evaluation_template: String,
    report_template: String,
}

impl PromptBuilder {
    pub fn from_config(config: &PromptConfig) -> Self {
        Self {
            evaluation_template: config.evaluation_template.clone(),
            report_template: config.report_template.clone(),
        }
    }

    /// System message for turn `step` of `total`; the report template is
    /// used when `step >= total`.
    pub fn build(&self, step: u32, total: u32, question: &str) -> Message {
        let template = if step >= total {
            &self.report_template
        } else {
            &self.evaluation_template
        };

        let content = template
            .replace("{step}", &step.to_string())
            .replace("{total}", &total.to_string())
            .replace("{question}", question)
            .replace("{cefr}", &cefr_table());

        Message::system(content)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
