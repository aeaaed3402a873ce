//! text/gemini renderer.

use smolnav_types::Url;

use super::RenderOptions;
use super::line::{LineKind, classify_line};
use super::style::Style;
use super::wrap::{chunk_fixed, display_width, wrap_hanging};
use crate::nav::LinkTable;

const QUOTE_PREFIX: &str = " > ";
const QUOTE_INDENT: usize = 3;
const BULLET: &str = "• ";
const BULLET_INDENT: usize = 2;

/// Render a gemtext document, appending its links to `links`.
///
/// `=:` input links are recognised only when `base` is a Spartan URL.
pub fn render(text: &str, base: &Url, opts: &RenderOptions, links: &mut LinkTable) -> String {
    let width = opts.text_width();
    let margin = " ".repeat(opts.margin());
    let input_links = base.scheme == "spartan";

    let mut out: Vec<String> = Vec::new();
    let mut emit = |lines: Vec<String>, style: Option<Style>| {
        for line in lines {
            if line.is_empty() {
                out.push(String::new());
                continue;
            }
            let line = match style {
                Some(style) => style.paint(&line, opts.color),
                None => line,
            };
            out.push(format!("{margin}{line}"));
        }
    };

    let mut preformatted = false;
    let body = text.strip_suffix('\n').unwrap_or(text);
    if body.is_empty() && text.is_empty() {
        return String::new();
    }

    for raw in body.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if preformatted {
            if line.starts_with("```") {
                preformatted = false;
            } else {
                emit(vec![line.to_string()], Some(Style::Preformatted));
            }
            continue;
        }

        match classify_line(line, input_links) {
            LineKind::Fence(_) => preformatted = true,
            LineKind::Heading { level, text } => {
                emit(wrap_hanging(text, width, "", 0), Some(Style::heading(level)));
            },
            LineKind::Quote(text) => {
                emit(
                    wrap_hanging(text, width, QUOTE_PREFIX, QUOTE_INDENT),
                    Some(Style::Quote),
                );
            },
            LineKind::ListItem(text) => {
                emit(wrap_hanging(text, width, BULLET, BULLET_INDENT), None);
            },
            LineKind::Link(rest) => match link_lines(rest, false, base, width, opts.color, links) {
                Some(lines) => emit(lines, None),
                None => emit(vec![line.to_string()], None),
            },
            LineKind::InputLink(rest) => match link_lines(rest, true, base, width, opts.color, links) {
                Some(lines) => emit(lines, None),
                None => emit(vec![line.to_string()], None),
            },
            LineKind::Text(text) if text.trim().is_empty() => emit(vec![String::new()], None),
            LineKind::Text(text) => emit(wrap_hanging(text, width, "", 0), None),
        }
    }

    out.join("\n")
}

/// Lay out a link line, registering its target. Only the label text is
/// styled; the `[n]` number stays plain.
///
/// Returns `None` when the line has no target or the target does not
/// resolve; the caller then shows the line unmodified.
fn link_lines(
    rest: &str,
    needs_input: bool,
    base: &Url,
    width: usize,
    color: bool,
    links: &mut LinkTable,
) -> Option<Vec<String>> {
    let mut tokens = rest.split_whitespace();
    let target = tokens.next()?;
    let resolved = match base.resolve(target) {
        Ok(url) => url,
        Err(e) => {
            log::debug!("leaving link {target:?} unresolved: {e}");
            return None;
        },
    };
    let label = tokens.collect::<Vec<_>>().join(" ");
    let label = if label.is_empty() { target.to_string() } else { label };

    let mut suffix = String::new();
    if needs_input {
        suffix.push_str(" [INPUT]");
    }
    if resolved.scheme != base.scheme {
        suffix.push_str(&format!(" ({})", resolved.scheme));
    }

    let n = links.push(resolved.to_string(), needs_input);
    let prefix = format!("[{n}] ");
    let lines = layout_link(&prefix, &label, &suffix, width)
        .into_iter()
        .map(|line| Style::Link.paint_tail(&line, prefix.len(), color))
        .collect();
    Some(lines)
}

/// Wrap `prefix label suffix` with a hanging indent under the label.
/// Labels without whitespace that do not fit are cut into fixed-width
/// chunks instead.
pub(crate) fn layout_link(prefix: &str, label: &str, suffix: &str, width: usize) -> Vec<String> {
    let indent = display_width(prefix);
    let unbreakable = !label.contains(char::is_whitespace);
    if !unbreakable || indent + display_width(label) <= width {
        return wrap_hanging(&format!("{label}{suffix}"), width, prefix, indent);
    }

    let pad = " ".repeat(indent);
    let mut lines: Vec<String> = chunk_fixed(label, width.saturating_sub(indent))
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                format!("{prefix}{chunk}")
            } else {
                format!("{pad}{chunk}")
            }
        })
        .collect();

    if !suffix.is_empty()
        && let Some(last) = lines.last_mut()
    {
        if display_width(last) + display_width(suffix) <= width {
            last.push_str(suffix);
        } else {
            lines.push(format!("{pad}{}", suffix.trim_start()));
        }
    }
    lines
}
