//! Line classification for text/gemini.

/// Kind of a single gemtext line, with the text the renderer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// ```` ``` ```` toggles preformatted mode; carries the alt text.
    Fence(&'a str),
    /// `#`, `##` or `###`. The text keeps its markers.
    Heading { level: u8, text: &'a str },
    /// `> text`, sigil removed.
    Quote(&'a str),
    /// `* text`, sigil removed.
    ListItem(&'a str),
    /// `=> target [label]`, sigil removed.
    Link(&'a str),
    /// `=: target [label]` on Spartan pages, sigil removed.
    InputLink(&'a str),
    Text(&'a str),
}

/// Classify one line (already stripped of its line terminator).
///
/// Tags are tried in a fixed order: fence, `###`, `##`, `#`, `> `, `* `,
/// `=>`, then `=:` when `input_links` is set. Anything else is text.
pub fn classify_line(line: &str, input_links: bool) -> LineKind<'_> {
    if let Some(alt) = line.strip_prefix("```") {
        return LineKind::Fence(alt.trim());
    }
    for (marker, level) in [("###", 3), ("##", 2), ("#", 1)] {
        if line.starts_with(marker) {
            return LineKind::Heading { level, text: line };
        }
    }
    if let Some(rest) = line.strip_prefix("> ") {
        return LineKind::Quote(rest);
    }
    if let Some(rest) = line.strip_prefix("* ") {
        return LineKind::ListItem(rest);
    }
    if let Some(rest) = line.strip_prefix("=>") {
        return LineKind::Link(rest);
    }
    if input_links && let Some(rest) = line.strip_prefix("=:") {
        return LineKind::InputLink(rest);
    }
    LineKind::Text(line)
}
