//! Document loading.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use reqwest::Client;
use scraper::{Html, Selector};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// User-Agent string identifying this fetcher
const USER_AGENT: &str = concat!("pagesumma/", env!("CARGO_PKG_VERSION"));

/// Default timeout for page fetches
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum PageError {
    #[error("failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("server returned {0} for {1}")]
    Status(u16, String),
    #[error("failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
}

/// A loaded page: where it came from plus its parsed tree
pub struct Page {
    /// URL or file path
    pub location: String,
    pub document: Html,
}

impl Page {
    pub fn from_html(location: impl Into<String>, html: &str) -> Self {
        Self {
            location: location.into(),
            document: Html::parse_document(html),
        }
    }

    /// Page title from <title> or the first <h1>
    pub fn title(&self) -> Option<String> {
        ["title", "h1"].iter().find_map(|tag| {
            let selector = Selector::parse(tag).ok()?;
            let element = self.document.select(&selector).next()?;
            let title: String = element.text().collect();
            let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
            (!title.is_empty()).then_some(title)
        })
    }
}

/// Create a configured HTTP client for fetching pages
fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Fetch and parse a page by URL
pub async fn fetch(url: &str) -> Result<Page, PageError> {
    let client = create_client()?;

    info!(url, "fetching page");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(PageError::Status(status.as_u16(), url.to_string()));
    }
    let html = response.text().await?;
    debug!(bytes = html.len(), "page fetched");

    Ok(Page::from_html(url, &html))
}

/// Read and parse a local HTML file
pub fn load_file(path: &Path) -> Result<Page, PageError> {
    let html = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = html.len(), "page read from disk");
    Ok(Page::from_html(path.display().to_string(), &html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn title_prefers_title_tag() {
        let page = Page::from_html(
            "mem",
            "<html><head><title> Hello\n  World </title></head><body><h1>Other</h1></body></html>",
        );
        assert_eq!(page.title().as_deref(), Some("Hello World"));
    }

    #[test]
    fn title_falls_back_to_h1() {
        let page = Page::from_html("mem", "<html><body><h1>Heading</h1></body></html>");
        assert_eq!(page.title().as_deref(), Some("Heading"));
    }

    #[test]
    fn load_file_parses_document() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("page.html");
        std::fs::write(&file, "<html><body><main>hi</main></body></html>").unwrap();
        let page = load_file(&file).unwrap();
        assert_eq!(page.location, file.display().to_string());
        let main = Selector::parse("main").unwrap();
        assert_eq!(page.document.select(&main).count(), 1);
    }

    #[tokio::test]
    async fn fetch_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/missing", server.uri());
        match fetch(&url).await {
            Err(PageError::Status(404, u)) => assert_eq!(u, url),
            _ => panic!("expected a 404 status error"),
        }
    }

    #[tokio::test]
    async fn fetch_parses_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><head><title>Post</title></head></html>"),
            )
            .mount(&server)
            .await;

        let page = fetch(&format!("{}/post", server.uri())).await.unwrap();
        assert_eq!(page.title().as_deref(), Some("Post"));
    }
}
