//! Nex directory listings: `=>` link lines among verbatim text.

use smolnav_types::Url;

use super::RenderOptions;
use super::style::Style;
use crate::nav::LinkTable;

/// Render a Nex directory, appending its links to `links`.
///
/// Only `=> target [label]` lines are interpreted. Link numbers below 10
/// get one leading space so single and double digit entries line up.
/// Nothing is wrapped.
pub fn render(body: &str, base: &Url, opts: &RenderOptions, links: &mut LinkTable) -> String {
    let body = body.strip_suffix('\n').unwrap_or(body);
    body.split('\n')
        .map(|raw| {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            match line.strip_prefix("=>") {
                Some(rest) => link_line(rest, base, opts, links).unwrap_or_else(|| line.to_string()),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn link_line(rest: &str, base: &Url, opts: &RenderOptions, links: &mut LinkTable) -> Option<String> {
    let mut tokens = rest.split_whitespace();
    let target = tokens.next()?;
    let resolved = base.resolve(target).ok()?;
    let label = tokens.collect::<Vec<_>>().join(" ");
    let label = if label.is_empty() { target } else { &label };

    let n = links.push(resolved.to_string(), false);
    let pad = if n < 10 { " " } else { "" };
    let mut text = format!("{pad}[{n}] {}", Style::Link.paint(label, opts.color));
    if resolved.scheme != base.scheme {
        text.push_str(&format!(" ({})", resolved.scheme));
    }
    Some(text)
}
