//! SGR styling for terminal output.
//!
//! Plain escape-sequence assembly; no terminal crate. Styling is
//! disabled when stdout is not a TTY or `NO_COLOR` is set, and in
//! tests, which assert on unstyled text.

use std::io::IsTerminal;

/// The styles the renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Bold,
    BoldUnderline,
    Dim,
    Italic,
    Cyan,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::BoldUnderline => "1;4",
            Style::Dim => "2",
            Style::Italic => "3",
            Style::Cyan => "36",
        }
    }
}

/// Applies SGR codes when enabled; passes text through when not.
#[derive(Debug, Clone, Copy)]
pub struct Styler {
    enabled: bool,
}

impl Styler {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Styler honoring `NO_COLOR` and stdout's TTY status.
    pub fn auto() -> Self {
        Self::new(std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal())
    }

    pub fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled && !text.is_empty() {
            format!("\u{1b}[{}m{}\u{1b}[0m", style.code(), text)
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_styler_passes_through() {
        let s = Styler::new(false);
        assert_eq!(s.paint(Style::Bold, "plain"), "plain");
    }

    #[test]
    fn enabled_styler_wraps_with_sgr() {
        let s = Styler::new(true);
        assert_eq!(s.paint(Style::Bold, "x"), "\u{1b}[1mx\u{1b}[0m");
        assert_eq!(s.paint(Style::Cyan, "x"), "\u{1b}[36mx\u{1b}[0m");
        assert_eq!(s.paint(Style::BoldUnderline, "x"), "\u{1b}[1;4mx\u{1b}[0m");
    }

    #[test]
    fn empty_text_never_emits_codes() {
        let s = Styler::new(true);
        assert_eq!(s.paint(Style::Dim, ""), "");
    }
}
