//! smolnav line-mode client.
//!
//! Reads commands from stdin and prints rendered pages to stdout. The
//! first argument, or `start_url` from the config file, is visited on
//! start. The config lives at `$SMOLNAV_CONFIG`, or
//! `$XDG_CONFIG_HOME/smolnav/config.toml`, or
//! `~/.config/smolnav/config.toml`.

mod commands;
mod prompter;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use commands::{Command, CommandOutput};
use prompter::StdinPrompter;
use smolnav_browser::{ClientConfig, Session};
use smolnav_net::{Connector, RustlsTlsProvider};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config_path = config_path();
    let config = match &config_path {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };
    log::debug!("config: {config:?}");

    let tls = if config.tls_verify {
        RustlsTlsProvider::new()
    } else {
        RustlsTlsProvider::permissive()
    }
    .context("setting up TLS")?;
    let connector = Connector::new(config.timeouts()).with_tls(Arc::new(tls));

    let start = std::env::args()
        .nth(1)
        .or_else(|| Some(config.start_url.clone()).filter(|u| !u.is_empty()));

    let mut session = Session::new(config, connector, StdinPrompter);
    session.set_term_width(term_width());

    if let Some(url) = start {
        show(&mut session, Command::Visit(url));
    }

    let stdin = io::stdin();
    loop {
        print!("smolnav> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        session.set_term_width(term_width());
        if !show(&mut session, Command::parse(&line)) {
            break;
        }
    }
    Ok(())
}

/// Run a command and print its output. Returns `false` on quit.
fn show(session: &mut Session<StdinPrompter>, cmd: Command) -> bool {
    match commands::execute(cmd, session) {
        CommandOutput::Quit => return false,
        CommandOutput::None => {},
        CommandOutput::Text(text) => println!("{text}"),
        CommandOutput::Page => {
            if let Some(page) = session.last_rendered() {
                println!("{}", page.text);
                if page.partial {
                    println!("[incomplete: the body was cut short]");
                }
            }
        },
    }
    true
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SMOLNAV_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("smolnav").join("config.toml"))
}

fn term_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _)| usize::from(cols))
        .unwrap_or(80)
}
