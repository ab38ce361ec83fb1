use colored::{ColoredString, Colorize};

use crate::constants::RULE_WIDTH;
use crate::session::RoutingMode;

/// Colors for terminal output, fixed at construction
///
/// With `color` disabled every style returns plain text, so output stays
/// readable when piped.
#[derive(Debug, Clone, Copy)]
pub struct DisplayTheme {
    color: bool,
}

impl DisplayTheme {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().bold())
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow())
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_black())
    }

    pub fn user_label(&self, text: &str) -> String {
        self.paint(text, |t| t.green().bold())
    }

    pub fn ai_label(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan())
    }

    pub fn rule(&self) -> String {
        self.muted(&"═".repeat(RULE_WIDTH))
    }

    pub fn mode(&self, mode: &RoutingMode) -> String {
        match mode {
            RoutingMode::Auto => self.paint(mode.label(), |t| t.cyan()),
            RoutingMode::Manual(model) => self.paint(
                &format!("{} ({})", mode.label(), model.display_name),
                |t| t.yellow(),
            ),
        }
    }
}

impl Default for DisplayTheme {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_has_no_escape_codes() {
        let theme = DisplayTheme::plain();

        assert_eq!(theme.heading("History"), "History");
        assert_eq!(theme.mode(&RoutingMode::Auto), "AUTO");
        assert!(!theme.rule().contains('\u{1b}'));
    }

    #[test]
    fn test_truncate_preview_counts_characters() {
        assert_eq!(truncate_preview("short", 200), "short");
        assert_eq!(truncate_preview("abcdef", 3), "abc...");
        // Multi-byte characters are never split
        assert_eq!(truncate_preview("ééééé", 2), "éé...");
        assert_eq!(truncate_preview("abc", 3), "abc");
    }
}
