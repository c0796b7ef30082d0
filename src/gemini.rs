//! Gemini `generateContent` wire types.
//!
//! Only the subset the summarizer sends and reads is modeled. Response fields
//! are optional so that shape problems surface as a malformed-response error
//! rather than a deserialization failure.

use serde::{Deserialize, Serialize};

/// Content part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Content in a turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Generate content request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    /// Single-turn request with one user part
    pub fn user_turn(text: String) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(text) }],
            }],
            system_instruction: None,
        }
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system_instruction = system.map(|text| Content {
            role: None,
            parts: vec![Part { text: Some(text) }],
        });
        self
    }
}

/// Generate content response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Candidate response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error response from API.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiError {
    pub error: GeminiErrorDetail,
}

/// Error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    /// Canonical status name, e.g. `RESOURCE_EXHAUSTED`
    #[serde(default)]
    pub status: Option<String>,
}

impl GeminiError {
    /// Human-readable reason: the message, else the status name
    pub fn reason(self) -> Option<String> {
        let GeminiErrorDetail { message, status } = self.error;
        message
            .filter(|m| !m.trim().is_empty())
            .or(status.filter(|s| !s.trim().is_empty()))
    }
}
