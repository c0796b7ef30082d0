//! Page summarization controller.
//!
//! Drives one invocation through
//! `Idle -> Extracting -> Extracted -> Requesting -> Succeeded | Failed -> Idle`,
//! keeping the page's banner in step. A trigger that arrives while an
//! invocation is in flight is rejected with [`SummaError::Busy`].

use crate::client::{SummarizationRequest, SummarizationResult, Summarizer};
use crate::config::{ControllerConfig, EXPLAIN_PROMPT, EXPLAIN_SYSTEM};
use crate::error::SummaError;
use crate::extractor;
use crate::message::{TriggerMessage, TriggerResponse};
use crate::presenter::{PresentationState, ResultPresenter};
use crate::settings::SettingsStore;
use scraper::Html;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Idle,
    Extracting,
    Extracted,
    Requesting,
    Succeeded,
    Failed,
}

/// Clears the busy flag when the invocation ends
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates extractor, summarizer and presenter for one page context.
pub struct PageSummarizationController {
    summarizer: Arc<dyn Summarizer>,
    presenter: Arc<Mutex<ResultPresenter>>,
    supports_custom_prompt: bool,
    default_prompt: String,
    busy: AtomicBool,
    transitions: Mutex<Vec<InvocationState>>,
}

impl PageSummarizationController {
    pub fn new(summarizer: Arc<dyn Summarizer>, config: &ControllerConfig) -> Self {
        Self {
            summarizer,
            presenter: Arc::new(Mutex::new(ResultPresenter::new())),
            supports_custom_prompt: config.supports_custom_prompt,
            default_prompt: config.default_prompt.clone(),
            busy: AtomicBool::new(false),
            transitions: Mutex::new(vec![InvocationState::Idle]),
        }
    }

    /// Shared handle on the page's banner
    pub fn presenter(&self) -> Arc<Mutex<ResultPresenter>> {
        Arc::clone(&self.presenter)
    }

    pub fn state(&self) -> InvocationState {
        lock(&self.transitions)
            .last()
            .copied()
            .unwrap_or(InvocationState::Idle)
    }

    /// States visited by the most recent invocation, starting at `Idle`
    pub fn last_transitions(&self) -> Vec<InvocationState> {
        lock(&self.transitions).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Read the stored settings and summarize `document`.
    ///
    /// Without an API key no request is made; the error is shown on the page.
    pub async fn trigger(
        &self,
        settings: &SettingsStore,
        override_key: Option<&str>,
        document: &Html,
    ) -> TriggerResponse {
        self.run(|| TriggerMessage::from_settings(settings, override_key), document)
            .await
    }

    /// Read the stored settings and summarize caller-provided `text`
    pub async fn trigger_text(
        &self,
        settings: &SettingsStore,
        override_key: Option<&str>,
        text: String,
    ) -> TriggerResponse {
        self.run(
            || TriggerMessage::text_from_settings(settings, override_key, text),
            &Html::new_document(),
        )
        .await
    }

    /// Handle one trigger. Always produces exactly one reply.
    pub async fn handle(&self, message: TriggerMessage, document: &Html) -> TriggerResponse {
        self.run(|| Ok(message), document).await
    }

    /// One guarded invocation. Building the trigger happens inside the guard,
    /// so a failure there is a `Failed` invocation and never touches a busy page.
    async fn run(
        &self,
        build: impl FnOnce() -> Result<TriggerMessage, SummaError>,
        document: &Html,
    ) -> TriggerResponse {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            warn!("trigger rejected, an invocation is already in flight");
            return TriggerResponse::from(Err(SummaError::Busy));
        };

        {
            let mut transitions = lock(&self.transitions);
            transitions.clear();
            transitions.push(InvocationState::Idle);
        }

        let result = match build() {
            Ok(message) => self.dispatch(message, document).await,
            Err(err) => self.fail(err),
        };

        self.transition(InvocationState::Idle);
        TriggerResponse::from(result)
    }

    async fn dispatch(&self, message: TriggerMessage, document: &Html) -> SummarizationResult {
        match message {
            TriggerMessage::SummarizePage { api_key, prompt } => {
                self.summarize_page(document, api_key, prompt).await
            }
            TriggerMessage::SummarizeText {
                api_key,
                prompt,
                text,
            } => self.summarize_text(text, api_key, prompt).await,
            TriggerMessage::ExplainCode { api_key, code } => self.explain_code(code, api_key).await,
        }
    }

    async fn summarize_page(
        &self,
        document: &Html,
        api_key: String,
        prompt: Option<String>,
    ) -> SummarizationResult {
        if api_key.trim().is_empty() {
            return self.fail(SummaError::MissingCredential);
        }

        self.transition(InvocationState::Extracting);
        let Some(content) = extractor::extract(document) else {
            return self.fail(SummaError::InsufficientContent);
        };
        self.transition(InvocationState::Extracted);
        info!(source = %content.source, chars = content.len(), "page content ready");

        let prompt = self.resolve_prompt(prompt);
        self.request(SummarizationRequest::new(content.text, prompt, api_key))
            .await
    }

    async fn summarize_text(
        &self,
        text: String,
        api_key: String,
        prompt: Option<String>,
    ) -> SummarizationResult {
        let text = self.caller_text(&text, &api_key)?;

        let prompt = self.resolve_prompt(prompt);
        self.request(SummarizationRequest::new(text, prompt, api_key))
            .await
    }

    /// Code skips extraction and always uses the explainer prompts
    async fn explain_code(&self, code: String, api_key: String) -> SummarizationResult {
        let code = self.caller_text(&code, &api_key)?;

        let request = SummarizationRequest::new(code, EXPLAIN_PROMPT, api_key)
            .map(|request| request.with_system(EXPLAIN_SYSTEM));
        self.request(request).await
    }

    /// Trimmed and capped caller-provided text, standing in for extraction
    fn caller_text(&self, text: &str, api_key: &str) -> SummarizationResult {
        if api_key.trim().is_empty() {
            return self.fail(SummaError::MissingCredential);
        }

        self.transition(InvocationState::Extracting);
        let text = text.trim();
        if text.is_empty() {
            return self.fail(SummaError::InsufficientContent);
        }
        let text = extractor::cap(text.to_string());
        self.transition(InvocationState::Extracted);
        Ok(text)
    }

    async fn request(&self, request: Result<SummarizationRequest, SummaError>) -> SummarizationResult {
        let request = match request {
            Ok(request) => request,
            Err(err) => return self.fail(err),
        };

        self.transition(InvocationState::Requesting);
        // Progress is on screen before the first await
        self.show(PresentationState::Loading);

        match self.summarizer.summarize(&request).await {
            Ok(summary) => {
                self.transition(InvocationState::Succeeded);
                self.show(PresentationState::success(&summary));
                Ok(summary)
            }
            Err(err) => self.fail(err),
        }
    }

    fn resolve_prompt(&self, prompt: Option<String>) -> String {
        match prompt {
            Some(prompt) if self.supports_custom_prompt && !prompt.trim().is_empty() => prompt,
            Some(_) if !self.supports_custom_prompt => {
                debug!("custom prompt ignored");
                self.default_prompt.clone()
            }
            _ => self.default_prompt.clone(),
        }
    }

    fn fail(&self, err: SummaError) -> SummarizationResult {
        self.transition(InvocationState::Failed);
        error!(error = %err, kind = ?err.kind(), "summarization failed");
        self.show_error(&err);
        Err(err)
    }

    fn show_error(&self, err: &SummaError) {
        self.show(PresentationState::error(banner_message(err)));
    }

    fn show(&self, state: PresentationState) {
        lock(&self.presenter).render(state);
    }

    fn transition(&self, next: InvocationState) {
        let mut transitions = lock(&self.transitions);
        debug!(from = ?transitions.last(), to = ?next, "invocation state");
        transitions.push(next);
    }
}

/// Text shown on the error banner
fn banner_message(err: &SummaError) -> String {
    match err {
        SummaError::InsufficientContent => err.to_string(),
        SummaError::MissingCredential => {
            "Error: API key not available. Please set it before summarizing.".to_string()
        }
        _ => format!("Error summarizing: {}", err),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
