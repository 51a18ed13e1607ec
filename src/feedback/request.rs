//! JSON exchanged with the feedback relay. The relay forwards the request body to the model
//! unchanged, so the shape follows the model's `generateContent` contract.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::{Feedback, FeedbackError, FeedbackRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Base64 encoded bytes.
    pub data: String,
    pub mime_type: String,
}

impl From<&FeedbackRequest> for GenerateContentRequest {
    fn from(request: &FeedbackRequest) -> Self {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: request.prompt_text.clone(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            data: STANDARD.encode(&request.audio.data),
                            mime_type: request.audio.mime_type.to_string(),
                        },
                    },
                ],
            }],
        }
    }
}

/// Failure body of the relay.
#[derive(Deserialize)]
struct RelayFailure {
    text: String,
}

impl Feedback {
    /// Parses a relay answer. On success the relay answers with the narrative as a JSON string,
    /// on failure with an object carrying a message in `text`.
    pub fn from_relay_body(body: &str) -> Result<Feedback, FeedbackError> {
        if let Ok(narrative_text) = serde_json::from_str::<String>(body) {
            return Ok(Feedback { narrative_text });
        }
        match serde_json::from_str::<RelayFailure>(body) {
            Ok(failure) => Err(FeedbackError::Transport(failure.text)),
            Err(e) => Err(FeedbackError::MalformedResponse(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        feedback::{Feedback, FeedbackError, FeedbackRequest},
        recorder::entities::AudioClip,
    };

    use super::GenerateContentRequest;

    #[test]
    fn test_request_body_shape() {
        let request = FeedbackRequest {
            prompt_text: "Analyze the lesson".into(),
            audio: AudioClip::new("audio/webm", b"abc".to_vec()),
        };

        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Analyze the lesson" },
                        { "inlineData": { "data": "YWJj", "mimeType": "audio/webm" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_relay_body_parsing() {
        assert_eq!(
            Feedback::from_relay_body(r#""The teacher asked 3 questions.""#).unwrap(),
            Feedback {
                narrative_text: "The teacher asked 3 questions.".into()
            }
        );
        assert!(matches!(
            Feedback::from_relay_body(r#"{"text":"quota exceeded"}"#),
            Err(FeedbackError::Transport(message)) if message == "quota exceeded"
        ));
        assert!(matches!(
            Feedback::from_relay_body("<html>"),
            Err(FeedbackError::MalformedResponse(_))
        ));
    }
}
