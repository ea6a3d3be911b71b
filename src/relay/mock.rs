//! Scripted relay double shared by the controller and playback tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::conversation::Message;
use crate::relay::client::{Evaluation, RelayClient, RelayError, SynthesizedAudio};
use crate::relay::voice::Voice;
use crate::relay::wire::validate_speech_text;

/// One recorded `evaluate` call.
#[derive(Debug, Clone)]
pub struct EvaluateCall {
    pub messages: Vec<Message>,
    pub step: u32,
    pub total_steps: u32,
}

/// Answers `evaluate` from a queue of scripted replies and records every
/// call. When the script runs dry it echoes `"ack: <last user message>"`.
///
/// `synthesize` returns the text's bytes as "audio", so playback doubles can
/// recover which utterance they were handed.
#[derive(Default)]
pub struct ScriptedRelay {
    replies: Mutex<VecDeque<Result<Evaluation, RelayError>>>,
    evaluate_calls: Mutex<Vec<EvaluateCall>>,
    synthesize_calls: Mutex<Vec<(String, Voice)>>,
    fail_synthesis_for: Mutex<Vec<String>>,
}

impl ScriptedRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, message: &str, is_final: bool) {
        self.replies.lock().unwrap().push_back(Ok(Evaluation {
            message: message.to_string(),
            is_final,
        }));
    }

    pub fn push_error(&self, error: RelayError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Make `synthesize` fail for this exact text.
    pub fn fail_synthesis_for(&self, text: &str) {
        self.fail_synthesis_for.lock().unwrap().push(text.to_string());
    }

    pub fn evaluate_calls(&self) -> Vec<EvaluateCall> {
        self.evaluate_calls.lock().unwrap().clone()
    }

    pub fn synthesized_texts(&self) -> Vec<String> {
        self.synthesize_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn synthesized_voices(&self) -> Vec<Voice> {
        self.synthesize_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, voice)| *voice)
            .collect()
    }
}

#[async_trait]
impl RelayClient for ScriptedRelay {
    async fn evaluate(
        &self,
        messages: &[Message],
        step: u32,
        total_steps: u32,
    ) -> Result<Evaluation, RelayError> {
        self.evaluate_calls.lock().unwrap().push(EvaluateCall {
            messages: messages.to_vec(),
            step,
            total_steps,
        });

        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }

        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(Evaluation {
            message: format!("ack: {last}"),
            is_final: false,
        })
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesizedAudio, RelayError> {
        validate_speech_text(text)?;
        let voice = Voice::resolve(voice);
        self.synthesize_calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice));

        if self.fail_synthesis_for.lock().unwrap().iter().any(|t| t == text) {
            return Err(RelayError::Upstream {
                status: 500,
                message: "Failed to generate speech".into(),
                details: None,
            });
        }

        Ok(SynthesizedAudio {
            bytes: text.as_bytes().to_vec(),
            voice,
        })
    }
}
