//! pagesumma CLI - page summarisation with an on-page banner
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use pagesumma::page::{self, Page};
use pagesumma::{
    extractor, Config, PageSummarizationController, SettingsStore, SummarizationClient,
    TriggerMessage, TriggerResponse,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagesumma")]
#[command(author, version, about = "Summarise web pages with Gemini", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a webpage by URL or a local HTML file
    Summarise {
        /// URL to summarise
        url: Option<String>,
        /// Local HTML file instead of a URL
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
        /// Print the banner as an HTML overlay fragment
        #[arg(long)]
        html: bool,
    },
    /// Summarise text read from stdin
    Text,
    /// Answer one JSON trigger read from stdin (summarizePage, summarizeText or explainCode)
    Message {
        /// Page the trigger refers to
        #[arg(long)]
        url: Option<String>,
        /// Local HTML file the trigger refers to
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
    },
    /// Manage the stored API key and prompt
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show stored settings
    Show,
    /// Store the Gemini API key
    SetKey { key: String },
    /// Store the summarisation prompt
    SetPrompt { prompt: String },
    /// Remove all stored settings
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load()?;
    debug!(endpoint = %config.provider.endpoint, model = %config.provider.model, "configuration loaded");

    match cli.command {
        Commands::Summarise {
            url,
            file,
            raw,
            html,
        } => {
            let page = load_page(url, file).await?.ok_or_else(|| anyhow!("a URL or --file is required"))?;
            let title = page.title().unwrap_or_else(|| "No title".to_string());

            if raw {
                let content = extractor::extract(&page.document)
                    .ok_or_else(|| anyhow!("not enough content on {}", page.location))?;
                println!("\n=== {} ===\n", title);
                println!("{}", content.text);
                println!(
                    "\n--- Extracted {} characters from {} ---",
                    content.len(),
                    content.source
                );
                return Ok(());
            }

            println!("Summarising: {}\n", title);
            let settings = open_settings(&config)?;
            let controller = build_controller(&config)?;
            let response = controller
                .trigger(&settings, config.api.gemini_key.as_deref(), &page.document)
                .await;

            show_banner(&controller, html)?;
            if response.is_error() {
                std::process::exit(1);
            }
        }
        Commands::Text => {
            let text = read_stdin()?;
            let settings = open_settings(&config)?;
            let controller = build_controller(&config)?;
            let response = controller
                .trigger_text(&settings, config.api.gemini_key.as_deref(), text)
                .await;

            show_banner(&controller, false)?;
            if response.is_error() {
                std::process::exit(1);
            }
        }
        Commands::Message { url, file } => {
            let input = read_stdin()?;
            let response = match serde_json::from_str::<TriggerMessage>(&input) {
                Ok(message) => {
                    let document = match load_page(url, file).await? {
                        Some(page) => page.document,
                        None => scraper::Html::new_document(),
                    };
                    build_controller(&config)?.handle(message, &document).await
                }
                Err(e) => TriggerResponse::Error {
                    error: format!("invalid trigger: {}", e),
                },
            };
            println!("{}", serde_json::to_string(&response)?);
        }
        Commands::Settings { action } => {
            let settings = open_settings(&config)?;
            match action {
                SettingsAction::Show => {
                    let key = settings.api_key()?;
                    println!(
                        "API key: {}",
                        key.as_deref().map(mask).unwrap_or_else(|| "(not set)".to_string())
                    );
                    if config.api.gemini_key.is_some() {
                        println!("         (GEMINI_API_KEY overrides the stored key)");
                    }
                    println!(
                        "Prompt:  {}",
                        settings
                            .prompt()?
                            .unwrap_or_else(|| format!("(default) {}", config.controller.default_prompt))
                    );
                }
                SettingsAction::SetKey { key } => {
                    settings.set_api_key(&key)?;
                    println!("API key saved.");
                }
                SettingsAction::SetPrompt { prompt } => {
                    settings.set_prompt(&prompt)?;
                    println!("Prompt saved.");
                }
                SettingsAction::Clear => {
                    settings.clear()?;
                    println!("Settings cleared.");
                }
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagesumma=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_controller(config: &Config) -> anyhow::Result<PageSummarizationController> {
    let client = SummarizationClient::new(&config.provider)?;
    Ok(PageSummarizationController::new(Arc::new(client), &config.controller))
}

fn open_settings(config: &Config) -> anyhow::Result<SettingsStore> {
    SettingsStore::open(&config.storage.path)
        .with_context(|| format!("opening settings at {}", config.storage.path.display()))
}

async fn load_page(url: Option<String>, file: Option<PathBuf>) -> anyhow::Result<Option<Page>> {
    match (url, file) {
        (Some(url), _) => Ok(Some(page::fetch(&url).await?)),
        (None, Some(path)) => Ok(Some(page::load_file(&path)?)),
        (None, None) => Ok(None),
    }
}

fn show_banner(controller: &PageSummarizationController, html: bool) -> anyhow::Result<()> {
    let presenter = controller.presenter();
    let presenter = presenter
        .lock()
        .map_err(|_| anyhow!("banner state poisoned"))?;
    match presenter.current() {
        Some(banner) if html => println!("{}", banner.to_html()),
        Some(banner) => println!("{}", banner),
        None => {}
    }
    Ok(())
}

fn read_stdin() -> anyhow::Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    if input.trim().is_empty() {
        bail!("nothing on stdin");
    }
    Ok(input)
}

/// Show only the last four characters of a key
fn mask(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", visible)
}
