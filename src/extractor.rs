//! Content extraction from a loaded document.
//!
//! Picks the most content-like region of the page and returns its visible
//! text, bounded to `[MIN_CHARS, MAX_CHARS]`.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use tracing::{debug, info, warn};

/// Extractions shorter than this are not worth summarizing
pub const MIN_CHARS: usize = 100;

/// Hard cap on the text sent to the provider
pub const MAX_CHARS: usize = 8000;

/// A container selector is only accepted above this length
const SELECTOR_MIN_CHARS: usize = 200;

const ARTICLE_SELECTOR: &str = "article, [role='article']";
const MAIN_SELECTOR: &str = "main, [role='main']";

/// Common content containers, in priority order
pub const CONTENT_SELECTORS: [&str; 7] = [
    ".post-content",
    ".entry-content",
    ".article-content",
    "#content",
    "#main-content",
    ".main-body",
    ".page-content",
];

const SKIPPED_TAGS: [&str; 7] = ["script", "style", "noscript", "template", "svg", "head", "iframe"];

const BLOCK_TAGS: [&str; 34] = [
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "td", "th", "ul",
    "body",
];

lazy_static! {
    static ref SCRIPT_MARKUP: Regex = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    static ref STYLE_MARKUP: Regex = Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    static ref BLANK_RUNS: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// Which part of the page the text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Article,
    Main,
    /// One of [`CONTENT_SELECTORS`]
    Selector(&'static str),
    Body,
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSource::Article => write!(f, "article"),
            ContentSource::Main => write!(f, "main"),
            ContentSource::Selector(selector) => write!(f, "{}", selector),
            ContentSource::Body => write!(f, "body"),
        }
    }
}

/// Text pulled out of a page, ready to be summarized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub source: ContentSource,
    pub(crate) truncated: bool,
}

impl ExtractedContent {
    /// Number of characters in the excerpt
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Extract the main textual content of a document.
///
/// Returns `None` when fewer than [`MIN_CHARS`] characters could be found.
pub fn extract(document: &Html) -> Option<ExtractedContent> {
    let (text, source) = locate(document);
    debug!(%source, "content located");
    bound(text, source)
}

/// Cap caller-provided text at [`MAX_CHARS`]
pub(crate) fn cap(text: String) -> String {
    truncate(text, MAX_CHARS).0
}

fn bound(text: String, source: ContentSource) -> Option<ExtractedContent> {
    let length = text.chars().count();
    if length < MIN_CHARS {
        warn!(length, %source, "insufficient content extracted");
        return None;
    }

    let (text, truncated) = truncate(text, MAX_CHARS);
    if truncated {
        warn!(from = length, to = MAX_CHARS, "content truncated");
    }
    info!(length = length.min(MAX_CHARS), %source, "content extracted");

    Some(ExtractedContent {
        text,
        source,
        truncated,
    })
}

fn locate(document: &Html) -> (String, ContentSource) {
    if let Some(text) = first_match(document, ARTICLE_SELECTOR) {
        return (text, ContentSource::Article);
    }
    if let Some(text) = first_match(document, MAIN_SELECTOR) {
        return (text, ContentSource::Main);
    }

    for selector in CONTENT_SELECTORS {
        if let Some(text) = first_match(document, selector) {
            if text.chars().count() > SELECTOR_MIN_CHARS {
                return (text, ContentSource::Selector(selector));
            }
        }
    }

    (body_text(document), ContentSource::Body)
}

fn first_match(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(visible_text)
}

/// Last resort: the whole page, with stray markup removed
fn body_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let text = visible_text(root);
    let text = SCRIPT_MARKUP.replace_all(&text, "");
    let text = STYLE_MARKUP.replace_all(&text, "");
    BLANK_RUNS.replace_all(&text, "\n").trim().to_string()
}

/// Rendered text of an element, approximating what a reader sees
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                // Source newlines are layout, not content
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) || el.attr("hidden").is_some() {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Hard cut at `max` characters
fn truncate(text: String, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => {
            let mut text = text;
            text.truncate(byte_index);
            (text, true)
        }
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lorem(chars: usize) -> String {
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit. "
            .chars()
            .cycle()
            .take(chars)
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><head><title>t</title></head><body>{}</body></html>", body))
    }

    #[test]
    fn article_wins_over_main() {
        let doc = page(&format!(
            "<main><p>{}</p></main><article><p>{}</p></article>",
            lorem(300),
            lorem(150)
        ));
        let content = extract(&doc).unwrap();
        assert_eq!(content.source, ContentSource::Article);
        assert_eq!(content.text, lorem(150));
    }

    #[test]
    fn main_is_used_without_article() {
        let doc = page(&format!("<nav>menu</nav><main>{}</main>", lorem(500)));
        let content = extract(&doc).unwrap();
        assert_eq!(content.source, ContentSource::Main);
        assert_eq!(content.text, lorem(500));
        assert!(!content.truncated);
    }

    #[test]
    fn role_main_counts_as_main() {
        let doc = page(&format!("<div role=\"main\">{}</div>", lorem(150)));
        assert_eq!(extract(&doc).unwrap().source, ContentSource::Main);
    }

    #[test]
    fn short_selector_match_is_skipped() {
        let doc = page(&format!(
            "<div class=\"post-content\">{}</div><div id=\"content\">{}</div>",
            lorem(150),
            lorem(250)
        ));
        let content = extract(&doc).unwrap();
        assert_eq!(content.source, ContentSource::Selector("#content"));
        assert_eq!(content.text, lorem(250));
    }

    #[test]
    fn falls_back_to_body_without_scripts_or_blank_lines() {
        let doc = page(&format!(
            "<div><p>{}</p>\n\n\n<script>var x = 1;</script><style>p {{}}</style><p>{}</p></div>",
            lorem(80),
            lorem(80)
        ));
        let content = extract(&doc).unwrap();
        assert_eq!(content.source, ContentSource::Body);
        assert_eq!(content.text, format!("{}\n{}", lorem(80), lorem(80)));
        assert!(!content.text.contains("var x"));
    }

    #[test]
    fn literal_markup_in_body_text_is_stripped() {
        let doc = page(&format!(
            "<pre>&lt;script&gt;alert(1)&lt;/script&gt;</pre><p>{}</p>",
            lorem(120)
        ));
        let content = extract(&doc).unwrap();
        assert!(!content.text.contains("alert"));
        assert_eq!(content.text, lorem(120));
    }

    #[test]
    fn short_pages_yield_nothing() {
        let doc = page("<main>Too short to bother.</main>");
        assert!(extract(&doc).is_none());
        assert!(extract(&Html::parse_document("")).is_none());
    }

    #[test]
    fn fallback_body_is_truncated_to_exactly_max() {
        let doc = page(&format!("<p>{}</p>", "a".repeat(9000)));
        let content = extract(&doc).unwrap();
        assert_eq!(content.source, ContentSource::Body);
        assert_eq!(content.len(), MAX_CHARS);
        assert!(content.truncated);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let doc = page(&format!("<main>{}</main>", "é".repeat(8100)));
        let content = extract(&doc).unwrap();
        assert_eq!(content.len(), MAX_CHARS);
        assert_eq!(content.text.len(), MAX_CHARS * 2);
    }

    #[test]
    fn extraction_length_is_always_within_bounds() {
        for size in [0, 50, 99, 100, 101, 250, 7999, 8000, 8001, 12_000] {
            let doc = page(&format!("<p>{}</p>", "x".repeat(size)));
            match extract(&doc) {
                Some(content) => {
                    assert!((MIN_CHARS..=MAX_CHARS).contains(&content.len()), "size {}", size)
                }
                None => assert!(size < MIN_CHARS, "size {}", size),
            }
        }
    }

    #[test]
    fn hidden_and_skipped_elements_are_invisible() {
        let doc = page(
            "<main><p>visible</p><p hidden>secret</p><noscript>enable js</noscript>\
             <template><p>tpl</p></template>line<br>break</main>",
        );
        let selector = Selector::parse("main").unwrap();
        let main = doc.select(&selector).next().unwrap();
        assert_eq!(visible_text(main), "visible\nline\nbreak");
    }

    #[test]
    fn inline_whitespace_collapses() {
        let doc = page("<main><p>one\n   two <b>three</b>\tfour</p></main>");
        let selector = Selector::parse("main").unwrap();
        let main = doc.select(&selector).next().unwrap();
        assert_eq!(visible_text(main), "one two three four");
    }
}
