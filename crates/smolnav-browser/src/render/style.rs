//! ANSI styling of rendered lines.
//!
//! Styles are applied to lines after wrapping, so escape sequences never
//! take part in width calculations.

use crossterm::style::Stylize;

/// Visual role of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Heading1,
    Heading2,
    Heading3,
    Link,
    Quote,
    Preformatted,
}

impl Style {
    /// Heading style for a level in `1..=3`.
    pub fn heading(level: u8) -> Self {
        match level {
            1 => Style::Heading1,
            2 => Style::Heading2,
            _ => Style::Heading3,
        }
    }

    /// `text` wrapped in this style's escape sequences, or unchanged when
    /// `enabled` is false.
    pub fn paint(self, text: &str, enabled: bool) -> String {
        if !enabled || text.is_empty() {
            return text.to_string();
        }
        match self {
            Style::Heading1 => text.bold().underlined().dark_yellow().to_string(),
            Style::Heading2 => text.bold().dark_magenta().to_string(),
            Style::Heading3 => text.green().to_string(),
            Style::Link => text.dark_blue().to_string(),
            Style::Quote => text.italic().dark_green().to_string(),
            Style::Preformatted => text.dark_yellow().to_string(),
        }
    }

    /// `line` with only the part from byte `at` on painted. Link numbers
    /// and tags stay plain this way.
    pub fn paint_tail(self, line: &str, at: usize, enabled: bool) -> String {
        match line.split_at_checked(at) {
            Some((head, tail)) => format!("{head}{}", self.paint(tail, enabled)),
            None => line.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_identity() {
        for style in [Style::Heading1, Style::Link, Style::Quote, Style::Preformatted] {
            assert_eq!(style.paint("text", false), "text");
        }
    }

    #[test]
    fn enabled_wraps_in_escapes() {
        let painted = Style::Heading1.paint("Title", true);
        assert!(painted.contains("Title"));
        assert!(painted.starts_with('\u{1b}'));
        assert_ne!(painted, "Title");
    }

    #[test]
    fn empty_text_stays_empty() {
        assert_eq!(Style::Link.paint("", true), "");
    }

    #[test]
    fn tail_only_is_painted() {
        let painted = Style::Link.paint_tail("[1] Label", 4, true);
        assert!(painted.starts_with("[1] \u{1b}"));
        assert!(painted.contains("Label"));
        assert_eq!(Style::Link.paint_tail("[1] Label", 4, false), "[1] Label");
        assert_eq!(Style::Link.paint_tail("[1]", 4, true), "[1]");
        assert_eq!(Style::Link.paint_tail("    ", 4, true), "    ");
    }

    #[test]
    fn heading_levels() {
        assert_eq!(Style::heading(1), Style::Heading1);
        assert_eq!(Style::heading(2), Style::Heading2);
        assert_eq!(Style::heading(3), Style::Heading3);
    }
}
