//! Line commands for the interactive prompt.

use smolnav_browser::nav::{History, LinkTable, TourList};
use smolnav_browser::redirect::RedirectChain;
use smolnav_browser::session::{Outcome, Prompter, Session};

pub const HELP: &str = "\
<url>            visit a URL (gemini:// is assumed)
<n>              follow link n (-1 is the last link)
i <n> <text>     send input to link n
b, back          previous page
r, reload        fetch the current page again
p, page          show the current page again
l, links         list the links of the current page
h, history       list visited pages
h <n>            revisit history entry n
t                visit the next tour entry
t <sel>...       add links to the tour (3 | 2,5 | 4, | ,3 | *)
t ls             list the tour
t go <n>         jump to tour entry n
t clear          empty the tour
redirects        show the last redirect chain
s <query>        search
q, quit          exit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Empty,
    Quit,
    Help,
    Visit(String),
    Link(i64),
    Input { link: i64, text: String },
    Back,
    Reload,
    Page,
    Links,
    History,
    HistoryVisit(i64),
    TourNext,
    TourAdd(String),
    TourList,
    TourGo(i64),
    TourClear,
    Redirects,
    Search(String),
    Usage(&'static str),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head {
            "" => Command::Empty,
            "q" | "quit" | "exit" => Command::Quit,
            "?" | "help" => Command::Help,
            "b" | "back" => Command::Back,
            "r" | "reload" => Command::Reload,
            "p" | "page" => Command::Page,
            "l" | "links" => Command::Links,
            "h" | "history" if rest.is_empty() => Command::History,
            "h" | "history" => rest
                .parse()
                .map(Command::HistoryVisit)
                .unwrap_or(Command::Usage("h <n>")),
            "redirects" => Command::Redirects,
            "s" | "search" if rest.is_empty() => Command::Usage("s <query>"),
            "s" | "search" => Command::Search(rest.to_string()),
            "i" | "input" => match rest.split_once(char::is_whitespace) {
                Some((n, text)) => match n.parse() {
                    Ok(link) => Command::Input {
                        link,
                        text: text.trim_start().to_string(),
                    },
                    Err(_) => Command::Usage("i <n> <text>"),
                },
                None => Command::Usage("i <n> <text>"),
            },
            "t" | "tour" => parse_tour(rest),
            _ if rest.is_empty() => match head.parse() {
                Ok(n) => Command::Link(n),
                Err(_) => Command::Visit(head.to_string()),
            },
            _ => Command::Visit(line.to_string()),
        }
    }
}

fn parse_tour(rest: &str) -> Command {
    let mut args = rest.split_whitespace();
    match (args.next(), args.next()) {
        (None, _) => Command::TourNext,
        (Some("ls" | "l"), _) => Command::TourList,
        (Some("clear" | "c"), _) => Command::TourClear,
        (Some("go" | "g"), Some(n)) => n
            .parse()
            .map(Command::TourGo)
            .unwrap_or(Command::Usage("t go <n>")),
        (Some("go" | "g"), None) => Command::Usage("t go <n>"),
        _ => Command::TourAdd(rest.to_string()),
    }
}

/// What the prompt loop should do after a command.
#[derive(Debug, PartialEq)]
pub enum CommandOutput {
    Text(String),
    /// Print the session's current page.
    Page,
    Quit,
    None,
}

/// Run `cmd` against the session.
pub fn execute<P: Prompter>(cmd: Command, session: &mut Session<P>) -> CommandOutput {
    let outcome = match cmd {
        Command::Empty => return CommandOutput::None,
        Command::Quit => return CommandOutput::Quit,
        Command::Help => return CommandOutput::Text(HELP.to_string()),
        Command::Usage(usage) => return CommandOutput::Text(format!("usage: {usage}")),
        Command::Page => {
            return match session.last_rendered() {
                Some(_) => CommandOutput::Page,
                None => CommandOutput::Text("no page yet".to_string()),
            };
        },
        Command::Links => return CommandOutput::Text(format_links(session.links())),
        Command::History => return CommandOutput::Text(format_history(session.history())),
        Command::TourList => return CommandOutput::Text(format_tour(session.tour())),
        Command::Redirects => return CommandOutput::Text(format_chain(session.redirect_chain())),
        Command::TourClear => {
            let removed = session.tour_mut().clear();
            return CommandOutput::Text(format!("removed {removed} tour entries"));
        },
        Command::TourAdd(selection) => {
            return CommandOutput::Text(match session.tour_add(&selection) {
                Ok(n) => format!("added {n} links to the tour"),
                Err(e) => format!("error: {e}"),
            });
        },
        Command::Visit(url) => session.navigate(&url),
        Command::Link(n) => session.visit_link(n),
        Command::Input { link, text } => session.submit_input(link, &text),
        Command::Back => session.go_back(),
        Command::HistoryVisit(n) => session.visit_history(n),
        Command::Reload => session.reload(),
        Command::TourNext => session.tour_next(),
        Command::TourGo(n) => session.tour_jump(n),
        Command::Search(query) => session.search(&query),
    };
    report(outcome)
}

fn report(outcome: Outcome) -> CommandOutput {
    match outcome {
        Outcome::Displayed => CommandOutput::Page,
        Outcome::Cancelled => CommandOutput::None,
        Outcome::Idle => CommandOutput::Text("nothing to visit".to_string()),
        Outcome::Failure { code, message } => {
            CommandOutput::Text(format!("server replied {code}: {message}"))
        },
        Outcome::Error(e) => CommandOutput::Text(format!("error: {e}")),
    }
}

// -------------------------------------------------------------------
// Listings
// -------------------------------------------------------------------

fn format_links(links: &LinkTable) -> String {
    if links.is_empty() {
        return "no links".to_string();
    }
    links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let marker = if link.needs_input { " [INPUT]" } else { "" };
            format!("[{}] {}{marker}", i + 1, link.url)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_history(history: &History) -> String {
    if history.is_empty() {
        return "no history".to_string();
    }
    numbered(history.entries(), None)
}

fn format_tour(tour: &TourList) -> String {
    if tour.is_empty() {
        return "tour is empty".to_string();
    }
    numbered(tour.entries(), Some(tour.cursor()))
}

fn format_chain(chain: &RedirectChain) -> String {
    if chain.is_empty() {
        return "no redirects".to_string();
    }
    let mut out = String::new();
    if chain.is_truncated() {
        out.push_str(&format!(
            "(last {} of {} redirects)\n",
            chain.len(),
            chain.total()
        ));
    }
    out.push_str(&chain.entries().join("\n-> "));
    out
}

/// `[n] entry` lines, marking `next` with `>`.
fn numbered(entries: &[String], next: Option<usize>) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, url)| {
            let mark = if next == Some(i) { ">" } else { " " };
            format!("{mark}[{}] {url}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
