//! Summarization client for the Gemini `generateContent` endpoint.
//!
//! One request per call, no retry. The request deadline is enforced by the
//! underlying HTTP client and reported as [`SummaError::Timeout`].

use crate::config::ProviderConfig;
use crate::error::SummaError;
use crate::gemini::{GeminiError, GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, error, info};

/// Summary text, or the reason there is none
pub type SummarizationResult = Result<String, SummaError>;

/// Everything needed for one summarization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizationRequest {
    pub text: String,
    pub prompt: String,
    pub api_key: String,
    /// Optional system instruction sent alongside the user turn
    pub system: Option<String>,
}

impl SummarizationRequest {
    pub fn new(
        text: impl Into<String>,
        prompt: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, SummaError> {
        let request = Self {
            text: text.into(),
            prompt: prompt.into(),
            api_key: api_key.into(),
            system: None,
        };
        if request.api_key.trim().is_empty() {
            return Err(SummaError::MissingCredential);
        }
        if request.prompt.trim().is_empty() {
            return Err(SummaError::MissingPrompt);
        }
        Ok(request)
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// The single user turn: prompt, blank line, page text
    pub fn user_text(&self) -> String {
        format!("{}\n\n{}", self.prompt, self.text)
    }
}

/// Anything that can turn a request into summary text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummarizationRequest) -> SummarizationResult;
}

/// HTTP client for the remote provider.
pub struct SummarizationClient {
    client: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl SummarizationClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, SummaError> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SummaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout,
        })
    }

    fn url(&self, api_key: &str) -> Result<Url, SummaError> {
        let base = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        Url::parse_with_params(&base, &[("key", api_key)])
            .map_err(|e| SummaError::Network(format!("invalid endpoint {}: {}", base, e)))
    }

    fn transport_error(&self, err: reqwest::Error) -> SummaError {
        if err.is_timeout() {
            SummaError::Timeout(self.timeout)
        } else {
            SummaError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Summarizer for SummarizationClient {
    async fn summarize(&self, request: &SummarizationRequest) -> SummarizationResult {
        let url = self.url(&request.api_key)?;
        let payload = GenerateContentRequest::user_turn(request.user_text())
            .with_system(request.system.clone());

        debug!(model = %self.model, chars = request.text.chars().count(), "sending generateContent request");

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .ok()
                .and_then(GeminiError::reason)
                .or_else(|| {
                    let raw = body.trim();
                    (!raw.is_empty()).then(|| raw.to_string())
                })
                .unwrap_or_else(|| "Unknown error".to_string());
            error!(status = status.as_u16(), %message, "provider returned an error");
            return Err(SummaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| SummaError::MalformedResponse(e.to_string()))?;

        match parsed.first_text() {
            Some(text) => {
                info!(chars = text.chars().count(), "summary received");
                Ok(text.to_string())
            }
            None => {
                error!("no candidate text in provider response");
                Err(SummaError::MalformedResponse(
                    "missing candidates[0].content.parts[0].text".to_string(),
                ))
            }
        }
    }
}
