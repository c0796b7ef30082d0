//! Trigger message contract.
//!
//! A caller sends one [`TriggerMessage`] and receives exactly one
//! [`TriggerResponse`]:
//!
//! ```json
//! { "action": "summarizePage", "apiKey": "...", "prompt": "..." }
//! { "action": "explainCode", "apiKey": "...", "code": "..." }
//! { "summary": "..." }  |  { "error": "..." }
//! ```

use crate::client::SummarizationResult;
use crate::error::SummaError;
use crate::settings::SettingsStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TriggerMessage {
    /// Summarize the page the controller is attached to
    SummarizePage {
        #[serde(default)]
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
    /// Summarize caller-provided text, e.g. a selection
    SummarizeText {
        #[serde(default)]
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
        text: String,
    },
    /// Explain a code snippet with a fixed prompt and system instruction
    ExplainCode {
        #[serde(default)]
        api_key: String,
        code: String,
    },
}

impl TriggerMessage {
    /// Build a page trigger from stored settings.
    ///
    /// `override_key` (e.g. from the environment) wins over the stored key.
    pub fn from_settings(
        settings: &SettingsStore,
        override_key: Option<&str>,
    ) -> Result<Self, SummaError> {
        Ok(TriggerMessage::SummarizePage {
            api_key: stored_key(settings, override_key)?,
            prompt: settings.prompt()?,
        })
    }

    /// Build a text trigger from stored settings
    pub fn text_from_settings(
        settings: &SettingsStore,
        override_key: Option<&str>,
        text: String,
    ) -> Result<Self, SummaError> {
        Ok(TriggerMessage::SummarizeText {
            api_key: stored_key(settings, override_key)?,
            prompt: settings.prompt()?,
            text,
        })
    }

    pub fn api_key(&self) -> &str {
        match self {
            TriggerMessage::SummarizePage { api_key, .. }
            | TriggerMessage::SummarizeText { api_key, .. }
            | TriggerMessage::ExplainCode { api_key, .. } => api_key,
        }
    }
}

fn stored_key(settings: &SettingsStore, override_key: Option<&str>) -> Result<String, SummaError> {
    match override_key.filter(|key| !key.trim().is_empty()) {
        Some(key) => Ok(key.to_string()),
        None => settings.api_key()?.ok_or(SummaError::MissingCredential),
    }
}

/// Reply to a trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriggerResponse {
    Summary { summary: String },
    Error { error: String },
}

impl TriggerResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, TriggerResponse::Error { .. })
    }
}

impl From<SummarizationResult> for TriggerResponse {
    fn from(result: SummarizationResult) -> Self {
        match result {
            Ok(summary) => TriggerResponse::Summary { summary },
            Err(err) => TriggerResponse::Error {
                error: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_trigger_uses_wire_names() {
        let message: TriggerMessage = serde_json::from_value(json!({
            "action": "summarizePage",
            "apiKey": "k",
            "prompt": "p"
        }))
        .unwrap();
        assert_eq!(
            message,
            TriggerMessage::SummarizePage {
                api_key: "k".into(),
                prompt: Some("p".into())
            }
        );
    }

    #[test]
    fn prompt_and_key_are_optional_on_the_wire() {
        let message: TriggerMessage =
            serde_json::from_value(json!({ "action": "summarizePage" })).unwrap();
        assert_eq!(message.api_key(), "");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "action": "summarizePage", "apiKey": "" })
        );
    }

    #[test]
    fn text_trigger_round_trips_action_tag() {
        let message: TriggerMessage = serde_json::from_value(json!({
            "action": "summarizeText",
            "apiKey": "k",
            "text": "selected words"
        }))
        .unwrap();
        assert!(matches!(message, TriggerMessage::SummarizeText { ref text, .. } if text == "selected words"));
    }

    #[test]
    fn explain_code_uses_wire_names() {
        let message: TriggerMessage = serde_json::from_value(json!({
            "action": "explainCode",
            "apiKey": "k",
            "code": "fn main() {}"
        }))
        .unwrap();
        assert_eq!(
            message,
            TriggerMessage::ExplainCode {
                api_key: "k".into(),
                code: "fn main() {}".into()
            }
        );
        assert_eq!(message.api_key(), "k");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "action": "explainCode", "apiKey": "k", "code": "fn main() {}" })
        );
    }

    #[test]
    fn explain_code_requires_code() {
        let result = serde_json::from_value::<TriggerMessage>(json!({
            "action": "explainCode",
            "apiKey": "k"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result = serde_json::from_value::<TriggerMessage>(json!({ "action": "explain" }));
        assert!(result.is_err());
    }

    #[test]
    fn responses_serialize_to_single_field() {
        let ok = TriggerResponse::from(Ok("sum".to_string()));
        let err = TriggerResponse::from(Err(SummaError::Api {
            status: 429,
            message: "rate limited".into(),
        }));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({ "summary": "sum" }));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "error": "429 - rate limited" })
        );
        assert!(err.is_error());
    }

    #[test]
    fn from_settings_requires_a_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::open(dir.path()).unwrap();

        assert_eq!(
            TriggerMessage::from_settings(&settings, None).unwrap_err(),
            SummaError::MissingCredential
        );

        settings.set_prompt("Short please.").unwrap();
        let message = TriggerMessage::from_settings(&settings, Some("env-key")).unwrap();
        assert_eq!(
            message,
            TriggerMessage::SummarizePage {
                api_key: "env-key".into(),
                prompt: Some("Short please.".into())
            }
        );
    }

    #[test]
    fn text_from_settings_carries_the_text() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::open(dir.path()).unwrap();

        assert_eq!(
            TriggerMessage::text_from_settings(&settings, None, "words".into()).unwrap_err(),
            SummaError::MissingCredential
        );

        settings.set_api_key("stored").unwrap();
        assert_eq!(
            TriggerMessage::text_from_settings(&settings, None, "words".into()).unwrap(),
            TriggerMessage::SummarizeText {
                api_key: "stored".into(),
                prompt: None,
                text: "words".into()
            }
        );
    }
}
