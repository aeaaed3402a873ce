//! Gopher menu renderer.
//!
//! Each menu line is `<type><title>\t<selector>\t<host>\t<port>`. Info
//! lines (type `i`) and lines with fewer than four fields are shown as
//! text; everything else becomes a numbered link tagged with its item
//! type. The block is centred in the terminal with the tags hanging to
//! the left of the text column.

use super::RenderOptions;
use super::style::Style;
use super::wrap::display_width;
use crate::nav::LinkTable;
use crate::protocol::gopher::item_tag;

/// One laid-out menu line: the text plus how far it hangs left of the
/// text column. `title_at` is the byte offset of a link's title.
struct MenuLine {
    text: String,
    hang: usize,
    title_at: Option<usize>,
}

/// Render a Gopher menu, appending its links to `links`.
pub fn render(body: &str, opts: &RenderOptions, links: &mut LinkTable) -> String {
    let mut menu = Vec::new();

    for raw in body.split('\n') {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line == "." {
            menu.push(MenuLine {
                text: String::new(),
                hang: 0,
                title_at: None,
            });
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let mut head = fields[0].chars();
        let kind = head.next().unwrap_or('i');
        let title = head.as_str();

        if fields.len() < 4 || kind == 'i' {
            menu.push(MenuLine {
                text: title.to_string(),
                hang: 0,
                title_at: None,
            });
            continue;
        }

        let (selector, host, port) = (fields[1], fields[2], fields[3].trim());
        let n = links.push(item_url(kind, selector, host, port), kind == '7');
        let tag = format!("({})", item_tag(kind).unwrap_or("???"));
        let text = format!("{tag}  [{n}] {title}");
        menu.push(MenuLine {
            title_at: Some(text.len() - title.len()),
            text,
            hang: display_width(&tag) + 2,
        });
    }

    // A body ending in a newline leaves one empty trailing line.
    if body.ends_with('\n') && menu.last().is_some_and(|l| l.text.is_empty()) {
        menu.pop();
    }

    align(menu, opts)
}

/// URL for a menu item.
pub fn item_url(kind: char, selector: &str, host: &str, port: &str) -> String {
    match kind {
        '8' | 'T' => format!("telnet://{host}:{port}"),
        'G' => format!("gemini://{host}:{port}{selector}"),
        'h' => match web_link(selector) {
            Some(url) if url.contains("://") => url.to_string(),
            Some(url) => format!("http://{url}"),
            None => format!("gopher://{host}:{port}/h{selector}"),
        },
        _ => format!("gopher://{host}:{port}/{kind}{selector}"),
    }
}

/// The target of a `URL:` selector.
fn web_link(selector: &str) -> Option<&str> {
    let (scheme, rest) = selector.split_once(':')?;
    scheme.eq_ignore_ascii_case("URL").then_some(rest)
}

/// Centre the text column, letting tags hang into the left space.
fn align(menu: Vec<MenuLine>, opts: &RenderOptions) -> String {
    let longest = menu
        .iter()
        .map(|l| display_width(&l.text).saturating_sub(l.hang))
        .max()
        .unwrap_or(0);
    let max_hang = menu.iter().map(|l| l.hang).max().unwrap_or(0);
    let column = (opts.term_width.saturating_sub(longest) / 2).max(max_hang);

    menu.into_iter()
        .map(|line| {
            if line.text.is_empty() {
                return String::new();
            }
            let pad = " ".repeat(column - line.hang);
            let text = match line.title_at {
                Some(at) => Style::Link.paint_tail(&line.text, at, opts.color),
                None => line.text,
            };
            format!("{pad}{text}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(term_width: usize) -> RenderOptions {
        RenderOptions {
            term_width,
            max_width: 100,
            left_margin: 0.0,
            color: false,
        }
    }

    #[test]
    fn item_urls() {
        assert_eq!(item_url('1', "/phlog", "h.org", "70"), "gopher://h.org:70/1/phlog");
        assert_eq!(item_url('0', "/a.txt", "h.org", "7070"), "gopher://h.org:7070/0/a.txt");
        assert_eq!(item_url('8', "", "bbs.org", "23"), "telnet://bbs.org:23");
        assert_eq!(item_url('T', "x", "bbs.org", "23"), "telnet://bbs.org:23");
        assert_eq!(item_url('G', "/index.gmi", "g.org", "1965"), "gemini://g.org:1965/index.gmi");
        assert_eq!(item_url('h', "URL:https://w.org/", "h.org", "70"), "https://w.org/");
        assert_eq!(item_url('h', "url:w.org/page", "h.org", "70"), "http://w.org/page");
        assert_eq!(item_url('h', "/page.html", "h.org", "70"), "gopher://h.org:70/h/page.html");
    }

    #[test]
    fn menu_links_and_info_lines() {
        let body = "iWelcome\t\terror.host\t1\r\n\
                    1Phlog\t/phlog\th.org\t70\r\n\
                    7Search\t/s\th.org\t70\r\n\
                    bare line\r\n\
                    .\r\n";
        let mut links = LinkTable::new();
        let out = render(body, &opts(40), &mut links);

        assert_eq!(links.len(), 2);
        assert_eq!(links.get(1).unwrap().url, "gopher://h.org:70/1/phlog");
        assert!(!links.get(1).unwrap().needs_input);
        assert!(links.get(2).unwrap().needs_input);

        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].trim(), "Welcome");
        assert_eq!(lines[1].trim(), "(DIR)  [1] Phlog");
        assert_eq!(lines[2].trim(), "(SEARCH)  [2] Search");
        assert_eq!(lines[3].trim(), "are line");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn text_column_is_shared() {
        let body = "iHello there\t\t\t\n1Dir\t/d\th\t70\n0Text\t/t\th\t70\n";
        let mut links = LinkTable::new();
        let out = render(body, &opts(60), &mut links);
        let lines: Vec<&str> = out.lines().collect();

        let info_col = lines[0].find("Hello").unwrap();
        let dir_col = lines[1].find("[1]").unwrap();
        let txt_col = lines[2].find("[2]").unwrap();
        assert_eq!(info_col, dir_col);
        assert_eq!(info_col, txt_col);
        // Longest text-column width is "[2] Text" / "Hello there" = 11.
        assert_eq!(info_col, (60 - 11) / 2);
    }

    #[test]
    fn narrow_terminal_keeps_tags_visible() {
        let body = "7A search item with a long title\t/s\th\t70\n";
        let mut links = LinkTable::new();
        let out = render(body, &opts(10), &mut links);
        assert!(out.starts_with("(SEARCH)  [1]"));
    }

    #[test]
    fn only_the_title_is_styled() {
        let o = RenderOptions {
            color: true,
            ..opts(20)
        };
        let mut links = LinkTable::new();
        let out = render("1Dir\t/d\th\t70", &o, &mut links);
        assert!(out.trim_start().starts_with("(DIR)  [1] \u{1b}"), "{out:?}");
        assert!(out.contains("Dir"));
    }

    #[test]
    fn unknown_type_tag() {
        let mut links = LinkTable::new();
        let out = render("xOdd\t/o\th\t70", &opts(20), &mut links);
        assert!(out.contains("(???)  [1] Odd"));
        assert_eq!(links.get(1).unwrap().url, "gopher://h:70/x/o");
    }
}
