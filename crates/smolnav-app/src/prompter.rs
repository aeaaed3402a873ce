//! Terminal prompts for redirects and input.

use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use smolnav_browser::session::Prompter;

/// Asks on stdout and reads answers from stdin.
pub struct StdinPrompter;

impl StdinPrompter {
    fn ask(&self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    /// Read a line without echoing it. Esc or Ctrl-C cancels.
    fn ask_hidden(&self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        io::stdout().flush().ok()?;
        if let Err(e) = terminal::enable_raw_mode() {
            log::warn!("cannot hide input: {e}");
            return self.ask("");
        }
        let line = read_hidden(event::read);
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("cannot restore terminal: {e}");
        }
        println!();
        line
    }
}

/// Collect key presses from `next_event` until Enter. A read error ends
/// the prompt as a cancel.
fn read_hidden(mut next_event: impl FnMut() -> io::Result<Event>) -> Option<String> {
    let mut line = String::new();
    loop {
        let key = match next_event() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("reading hidden input: {e}");
                return None;
            },
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Some(line),
            KeyCode::Esc => return None,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return None,
            KeyCode::Backspace => {
                line.pop();
            },
            KeyCode::Char(c) => line.push(c),
            _ => {},
        }
    }
}

impl Prompter for StdinPrompter {
    fn confirm_redirect(&mut self, target: &str, chain: &[String]) -> bool {
        if !chain.is_empty() {
            println!("redirects so far:");
            for hop in chain {
                println!("  {hop}");
            }
        }
        self.ask(&format!("follow redirect to {target}? [y/N] "))
            .is_some_and(|answer| is_yes(&answer))
    }

    fn read_input(&mut self, prompt: &str, sensitive: bool) -> Option<String> {
        let prompt = format!("{prompt}> ");
        if sensitive {
            self.ask_hidden(&prompt)
        } else {
            self.ask(&prompt)
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
