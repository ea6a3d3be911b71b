//! Request and response shapes of the two relays.
//!
//! Interpretation of a response is kept apart from the HTTP transport so the
//! status/body rules can be checked without a server.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::conversation::Message;
use crate::relay::client::{Evaluation, RelayError, SynthesizedAudio};
use crate::relay::voice::Voice;

/// Longest text the speech relay accepts, in UTF-16 code units.
pub const MAX_SPEECH_UNITS: usize = 4096;

/// Response header naming the voice the speech relay used.
pub const VOICE_USED_HEADER: &str = "x-voice-used";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest<'a> {
    pub messages: &'a [Message],
    pub evaluation_step: u32,
    pub total_steps: u32,
}

#[derive(Debug, Serialize)]
pub struct SpeechRequest<'a> {
    pub text: &'a str,
    pub voice: Voice,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    is_final: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Check speech text before any request is made.
pub fn validate_speech_text(text: &str) -> Result<(), RelayError> {
    if text.trim().is_empty() {
        return Err(RelayError::EmptyText);
    }
    let len = text.encode_utf16().count();
    if len > MAX_SPEECH_UNITS {
        return Err(RelayError::TextTooLong {
            len,
            max: MAX_SPEECH_UNITS,
        });
    }
    Ok(())
}

/// Map an evaluation relay response onto [`Evaluation`].
pub fn interpret_evaluation(status: StatusCode, body: &[u8]) -> Result<Evaluation, RelayError> {
    if !status.is_success() {
        return Err(status_error(status, body));
    }

    let parsed: EvaluationBody =
        serde_json::from_slice(body).map_err(|e| RelayError::Parse(e.to_string()))?;

    let message = parsed
        .message
        .as_ref()
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(RelayError::MissingMessage)?;

    Ok(Evaluation {
        message: message.to_string(),
        is_final: parsed.is_final.unwrap_or(false),
    })
}

/// Map a speech relay response onto [`SynthesizedAudio`].
pub fn interpret_speech(
    status: StatusCode,
    voice_used: Option<&str>,
    requested: Voice,
    body: Vec<u8>,
) -> Result<SynthesizedAudio, RelayError> {
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    if body.is_empty() {
        return Err(RelayError::EmptyAudio);
    }

    let voice = voice_used.and_then(Voice::parse).unwrap_or(requested);
    Ok(SynthesizedAudio { bytes: body, voice })
}

/// 4xx → [`RelayError::Rejected`], everything else → [`RelayError::Upstream`].
fn status_error(status: StatusCode, body: &[u8]) -> RelayError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed.error.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    if status.is_client_error() {
        RelayError::Rejected {
            status: status.as_u16(),
            message,
        }
    } else {
        RelayError::Upstream {
            status: status.as_u16(),
            message,
            details: parsed.details,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;

    #[test]
    fn evaluation_request_uses_camel_case_keys() {
        let messages = vec![
            Message::system("Evaluate."),
            Message::user("Hi I'm Alex"),
        ];
        let req = EvaluationRequest {
            messages: &messages,
            evaluation_step: 1,
            total_steps: 5,
        };

        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["evaluationStep"], 1);
        assert_eq!(json["totalSteps"], 5);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Hi I'm Alex");
    }

    #[test]
    fn speech_request_sends_voice_name() {
        let json = serde_json::to_value(SpeechRequest {
            text: "Hello",
            voice: Voice::Echo,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "text": "Hello", "voice": "echo" }));
    }

    #[test]
    fn success_with_message_and_final_flag() {
        let body = br#"{"message":"Overall: B2","isFinal":true}"#;
        let eval = interpret_evaluation(StatusCode::OK, body).unwrap();
        assert_eq!(eval.message, "Overall: B2");
        assert!(eval.is_final);
    }

    #[test]
    fn missing_final_flag_defaults_to_false() {
        let eval = interpret_evaluation(StatusCode::OK, br#"{"message":"Thanks!"}"#).unwrap();
        assert!(!eval.is_final);
    }

    #[test]
    fn success_without_message_is_an_error() {
        let err = interpret_evaluation(StatusCode::OK, br#"{"isFinal":false}"#).unwrap_err();
        assert!(matches!(err, RelayError::MissingMessage));
    }

    #[test]
    fn non_text_or_blank_message_is_an_error() {
        let err = interpret_evaluation(StatusCode::OK, br#"{"message":42}"#).unwrap_err();
        assert!(matches!(err, RelayError::MissingMessage));

        let err = interpret_evaluation(StatusCode::OK, br#"{"message":"  "}"#).unwrap_err();
        assert!(matches!(err, RelayError::MissingMessage));
    }

    #[test]
    fn success_with_invalid_json_is_a_parse_error() {
        let err = interpret_evaluation(StatusCode::OK, b"<html>").unwrap_err();
        assert!(matches!(err, RelayError::Parse(_)));
    }

    #[test]
    fn server_error_keeps_error_and_details() {
        let body = br#"{"error":"upstream down","details":"503 from provider"}"#;
        let err = interpret_evaluation(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();

        match err {
            RelayError::Upstream {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
                assert_eq!(details.as_deref(), Some("503 from provider"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn client_errors_are_rejections() {
        let err =
            interpret_evaluation(StatusCode::BAD_REQUEST, br#"{"error":"Invalid messages format"}"#)
                .unwrap_err();
        match err {
            RelayError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid messages format");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = interpret_evaluation(StatusCode::METHOD_NOT_ALLOWED, b"").unwrap_err();
        match err {
            RelayError::Rejected { status, message } => {
                assert_eq!(status, 405);
                assert_eq!(message, "Method Not Allowed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn speech_uses_voice_header_when_valid() {
        let audio =
            interpret_speech(StatusCode::OK, Some("onyx"), Voice::Nova, vec![0xFF, 0xFB]).unwrap();
        assert_eq!(audio.voice, Voice::Onyx);
        assert_eq!(audio.bytes, vec![0xFF, 0xFB]);
    }

    #[test]
    fn speech_falls_back_to_requested_voice() {
        let audio = interpret_speech(StatusCode::OK, None, Voice::Fable, vec![1]).unwrap();
        assert_eq!(audio.voice, Voice::Fable);

        let audio = interpret_speech(StatusCode::OK, Some("robot"), Voice::Nova, vec![1]).unwrap();
        assert_eq!(audio.voice, Voice::Nova);
    }

    #[test]
    fn speech_with_empty_body_is_an_error() {
        let err = interpret_speech(StatusCode::OK, None, Voice::Nova, Vec::new()).unwrap_err();
        assert!(matches!(err, RelayError::EmptyAudio));
    }

    #[test]
    fn speech_error_status_is_reported() {
        let body = br#"{"error":"Text too long (max 4096 characters)","details":"Received 5000 characters"}"#
            .to_vec();
        let err = interpret_speech(StatusCode::BAD_REQUEST, None, Voice::Nova, body).unwrap_err();
        assert!(matches!(err, RelayError::Rejected { status: 400, .. }));
    }

    #[test]
    fn text_length_is_counted_in_utf16_units() {
        assert!(validate_speech_text(&"a".repeat(MAX_SPEECH_UNITS)).is_ok());
        assert!(matches!(
            validate_speech_text(&"a".repeat(MAX_SPEECH_UNITS + 1)),
            Err(RelayError::TextTooLong { len: 4097, max: 4096 })
        ));

        // Astral characters take two units each.
        let emoji = "📊".repeat(2049);
        assert!(matches!(
            validate_speech_text(&emoji),
            Err(RelayError::TextTooLong { len: 4098, .. })
        ));
    }
}
