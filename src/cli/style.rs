//! Terminal styling
//!
//! Colors come from an explicit [`Theme`]; `anstream::println!` strips the
//! escape codes again when stdout is not a terminal.

use git_stack::config::ThemeName;
use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style};
use std::fmt::Display;
use supports_hyperlinks::Stream;

/// Success mark
pub const CHECK: &str = "✓";
/// Failure mark
pub const CROSS: &str = "✗";
/// List arrow
pub const ARROW: &str = "→";

/// Resolved output styles
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Current stack, current branch
    pub primary: Style,
    /// Counts, branch names inside messages
    pub accent: Style,
    /// Secondary information
    pub muted: Style,
    /// Headings
    pub emphasis: Style,
    /// Completed actions
    pub success: Style,
    /// Problems and hints
    pub warn: Style,
    /// Failures
    pub error: Style,
    hyperlinks: bool,
}

impl Theme {
    /// Theme for a configured name
    pub fn from_name(name: ThemeName) -> Self {
        let hyperlinks = supports_hyperlinks::on(Stream::Stdout);
        match name {
            ThemeName::Default => Self {
                primary: Style::new().truecolor(255, 165, 0).bold(),
                accent: Style::new().cyan(),
                muted: Style::new().dimmed(),
                emphasis: Style::new().bold(),
                success: Style::new().green(),
                warn: Style::new().yellow(),
                error: Style::new().red(),
                hyperlinks,
            },
            ThemeName::Mono => Self {
                primary: Style::new().bold(),
                accent: Style::new(),
                muted: Style::new().dimmed(),
                emphasis: Style::new().bold(),
                success: Style::new(),
                warn: Style::new(),
                error: Style::new().bold(),
                hyperlinks,
            },
        }
    }

    /// `text` styled with `style`, as an owned string
    pub fn paint(style: Style, text: impl Display) -> String {
        text.style(style).to_string()
    }

    /// A URL, clickable where the terminal supports it
    pub fn link(&self, url: &str) -> String {
        if self.hyperlinks {
            terminal_link::Link::new(url, url).to_string()
        } else {
            url.to_string()
        }
    }

    /// Green check mark
    pub fn check(&self) -> String {
        Self::paint(self.success, CHECK)
    }

    /// Red cross
    pub fn cross(&self) -> String {
        Self::paint(self.error, CROSS)
    }

    /// Muted arrow
    pub fn arrow(&self) -> String {
        Self::paint(self.muted, ARROW)
    }
}

/// Spinner used for long-running git and host operations
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
