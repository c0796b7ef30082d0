//! Result banner.
//!
//! The presenter owns at most one banner. Every render replaces the current
//! banner; the banner only goes away when the user dismisses it.

use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use tracing::debug;

/// Element id of the overlay, shared by every banner
pub const BANNER_ID: &str = "summa-banner";

pub const LOADING_MESSAGE: &str = "Summarizing page content...";

lazy_static! {
    static ref BULLET_PREFIX: Regex = Regex::new(r"^\s*(?:[-*•]|\d+\.)\s+").unwrap();
}

/// How a summary should be laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryLayout {
    /// List items with their bullet prefixes stripped
    Bulleted(Vec<String>),
    /// The raw summary text
    Paragraph(String),
}

/// Decide between a bulleted list and a paragraph.
///
/// Blank lines are dropped. At least two lines, one of them starting with a
/// bullet (`-`, `*`, `•` or `1.`), make a list.
pub fn classify_lines(summary: &str) -> SummaryLayout {
    let lines: Vec<&str> = summary.lines().filter(|line| !line.trim().is_empty()).collect();

    if lines.len() >= 2 && lines.iter().any(|line| BULLET_PREFIX.is_match(line)) {
        let items = lines
            .iter()
            .map(|line| BULLET_PREFIX.replace(line, "").trim().to_string())
            .collect();
        SummaryLayout::Bulleted(items)
    } else {
        SummaryLayout::Paragraph(summary.to_string())
    }
}

/// What the banner is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationState {
    Loading,
    Success { lines: Vec<String>, bulleted: bool },
    Error(String),
}

impl PresentationState {
    /// Success state for a summary, laid out by [`classify_lines`]
    pub fn success(summary: &str) -> Self {
        match classify_lines(summary) {
            SummaryLayout::Bulleted(items) => PresentationState::Success {
                lines: items,
                bulleted: true,
            },
            SummaryLayout::Paragraph(text) => PresentationState::Success {
                lines: vec![text],
                bulleted: false,
            },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        PresentationState::Error(message.into())
    }

    pub fn theme(&self) -> Theme {
        match self {
            PresentationState::Loading => Theme::LOADING,
            PresentationState::Success { .. } => Theme::SUCCESS,
            PresentationState::Error(_) => Theme::ERROR,
        }
    }

    fn modifier(&self) -> &'static str {
        match self {
            PresentationState::Loading => "loading",
            PresentationState::Success { .. } => "success",
            PresentationState::Error(_) => "error",
        }
    }
}

/// Banner colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: &'static str,
    pub foreground: &'static str,
    pub border: &'static str,
}

impl Theme {
    /// Amber
    pub const LOADING: Theme = Theme {
        background: "#fff3cd",
        foreground: "#664d03",
        border: "#ffecb5",
    };
    /// Red
    pub const ERROR: Theme = Theme {
        background: "#fee2e2",
        foreground: "#991b1b",
        border: "#fca5a5",
    };
    /// Blue
    pub const SUCCESS: Theme = Theme {
        background: "#e0e7ff",
        foreground: "#2d3748",
        border: "#a7b3ff",
    };
}

/// One on-page banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    serial: u64,
    state: PresentationState,
}

impl Banner {
    /// Distinguishes successive banners on the same page
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    /// Overlay fragment, fixed to the top of the page.
    ///
    /// Clicking anywhere on the banner or on its close control removes it.
    pub fn to_html(&self) -> String {
        let theme = self.state.theme();
        let body = match &self.state {
            PresentationState::Loading => format!("<p>{}</p>", escape(LOADING_MESSAGE)),
            PresentationState::Error(message) => format!("<p>{}</p>", escape(message)),
            PresentationState::Success {
                lines,
                bulleted: true,
            } => {
                let items: String = lines
                    .iter()
                    .map(|line| format!("<li>{}</li>", escape(line)))
                    .collect();
                format!(
                    "<ul style=\"list-style-type: disc; padding-left: 1.5rem; margin: 0;\">{}</ul>",
                    items
                )
            }
            PresentationState::Success { lines, .. } => format!(
                "<p style=\"white-space: pre-wrap; margin: 0;\">{}</p>",
                escape(&lines.join("\n"))
            ),
        };

        format!(
            concat!(
                "<div id=\"{id}\" class=\"{id} {id}--{modifier}\" data-serial=\"{serial}\" role=\"status\" ",
                "onclick=\"this.remove()\" style=\"position: fixed; top: 0; left: 0; width: 100%; ",
                "background-color: {bg}; color: {fg}; border-bottom: 1px solid {border}; ",
                "padding: 1rem 1.5rem; box-shadow: 0 2px 8px rgba(0,0,0,0.1); z-index: 2147483647; ",
                "font-family: 'Inter', sans-serif; font-size: 1rem; line-height: 1.5; display: flex; ",
                "align-items: flex-start; justify-content: space-between; box-sizing: border-box; cursor: pointer;\">",
                "<div class=\"{id}__content\" style=\"flex-grow: 1; margin-right: 1rem; overflow-wrap: break-word;\">{body}</div>",
                "<button type=\"button\" class=\"{id}__close\" aria-label=\"Close\" ",
                "onclick=\"event.stopPropagation(); this.parentNode.remove()\" ",
                "style=\"background: none; border: none; font-size: 1.5rem; cursor: pointer; color: {fg}; ",
                "line-height: 1; padding: 0; margin-left: 1rem;\">&times;</button>",
                "</div>"
            ),
            id = BANNER_ID,
            modifier = self.state.modifier(),
            serial = self.serial,
            bg = theme.background,
            fg = theme.foreground,
            border = theme.border,
            body = body,
        )
    }
}

/// Terminal rendering
impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            PresentationState::Loading => write!(f, "{}", format!("⏳ {}", LOADING_MESSAGE).yellow()),
            PresentationState::Error(message) => write!(f, "{}", format!("✖ {}", message).red().bold()),
            PresentationState::Success {
                lines,
                bulleted: true,
            } => {
                writeln!(f, "{}", "📌 Summary:".blue().bold())?;
                for line in lines {
                    writeln!(f, "  • {}", line)?;
                }
                Ok(())
            }
            PresentationState::Success { lines, .. } => {
                writeln!(f, "{}", "📌 Summary:".blue().bold())?;
                for line in lines {
                    writeln!(f, "  {}", line)?;
                }
                Ok(())
            }
        }
    }
}

/// Owner of the page's single banner.
#[derive(Debug, Default)]
pub struct ResultPresenter {
    current: Option<Banner>,
    rendered: u64,
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is on screen with a banner for `state`
    pub fn render(&mut self, state: PresentationState) -> &Banner {
        if let Some(previous) = self.current.take() {
            debug!(serial = previous.serial, "removing existing banner");
        }

        self.rendered += 1;
        debug!(serial = self.rendered, kind = state.modifier(), "showing banner");
        self.current.insert(Banner {
            serial: self.rendered,
            state,
        })
    }

    pub fn current(&self) -> Option<&Banner> {
        self.current.as_ref()
    }

    /// Number of banners on the page, never more than one
    pub fn banner_count(&self) -> usize {
        usize::from(self.current.is_some())
    }

    /// User clicked somewhere on the banner
    pub fn click(&mut self) -> Option<Banner> {
        self.dismiss("banner clicked")
    }

    /// User pressed the close control
    pub fn close(&mut self) -> Option<Banner> {
        self.dismiss("close control pressed")
    }

    fn dismiss(&mut self, reason: &str) -> Option<Banner> {
        let removed = self.current.take();
        if let Some(banner) = &removed {
            debug!(serial = banner.serial, reason, "banner dismissed");
        }
        removed
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
