//! # pagesumma
//!
//! Page-content summarisation pipeline: pull the readable text out of a page,
//! ask a Gemini model to summarise it, and show the result in a single
//! dismissible banner.
//!
//! ## Pipeline
//!
//! - **Extraction** ([`extractor`]): article, main, common containers, then the whole body
//! - **Summarization** ([`client`]): one `generateContent` call with an explicit timeout
//! - **Presentation** ([`presenter`]): loading, success (list or paragraph) and error banners
//! - **Control** ([`controller`]): the per-page state machine behind the [`message`] contract

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod extractor;
pub mod gemini;
pub mod message;
pub mod page;
pub mod presenter;
pub mod settings;

pub use client::{SummarizationClient, SummarizationRequest, SummarizationResult, Summarizer};
pub use config::Config;
pub use controller::{InvocationState, PageSummarizationController};
pub use error::{ErrorKind, SummaError};
pub use extractor::{ContentSource, ExtractedContent};
pub use message::{TriggerMessage, TriggerResponse};
pub use presenter::{PresentationState, ResultPresenter};
pub use settings::SettingsStore;
