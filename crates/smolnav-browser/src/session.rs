//! Browsing session: the navigation loop and the state it owns.
//!
//! A [`Session`] turns user actions (a typed URL, a link number, "back")
//! into protocol transactions, follows redirects under the configured
//! policy, renders the result, and only then installs the new page's
//! links and history entry. Every failure stops at this boundary and is
//! reported as an [`Outcome`].

use smolnav_net::Connector;
use smolnav_types::Url;
use smolnav_types::error::{NavError, Result};
use smolnav_types::url::percent_encode;

use crate::config::ClientConfig;
use crate::nav::{History, LinkTable, TourList, parse_selection};
use crate::protocol::{Protocol, Response, Status};
use crate::redirect::{Decision, RedirectChain, RedirectController};
use crate::render::{self, Page, RenderOptions, RenderedPage};

/// Questions the session asks the user.
pub trait Prompter {
    /// Follow a redirect to `target`? `chain` holds the recent redirect
    /// targets when the configuration asks for them, otherwise it is empty.
    fn confirm_redirect(&mut self, target: &str, chain: &[String]) -> bool;

    /// Read one line of input. `None` cancels.
    fn read_input(&mut self, prompt: &str, sensitive: bool) -> Option<String>;
}

/// Result of one user action.
#[derive(Debug)]
pub enum Outcome {
    /// A page was rendered and installed; see [`Session::last_rendered`].
    Displayed,
    /// The user declined a prompt.
    Cancelled,
    /// Nothing to do: no earlier page, empty tour.
    Idle,
    /// The server answered with a failure status.
    Failure { code: u8, message: String },
    Error(NavError),
}

pub struct Session<P: Prompter> {
    config: ClientConfig,
    connector: Connector,
    prompter: P,
    term_width: usize,
    links: LinkTable,
    history: History,
    tour: TourList,
    redirects: RedirectController,
    last: Option<RenderedPage>,
}

impl<P: Prompter> Session<P> {
    pub fn new(config: ClientConfig, connector: Connector, prompter: P) -> Self {
        let redirects = RedirectController::new(config.max_redirects);
        Self {
            config,
            connector,
            prompter,
            term_width: 80,
            links: LinkTable::new(),
            history: History::new(),
            tour: TourList::new(),
            redirects,
            last: None,
        }
    }

    pub fn set_term_width(&mut self, width: usize) {
        self.term_width = width.max(1);
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    /// Render `page` with the session's layout settings. Session state is
    /// left alone.
    pub fn render_page(&self, page: &Page) -> Result<RenderedPage> {
        render::render(page, &RenderOptions::from_config(&self.config, self.term_width))
    }

    // -----------------------------------------------------------------------
    // Navigation entry points
    // -----------------------------------------------------------------------

    /// Visit something the user typed.
    pub fn navigate(&mut self, input: &str) -> Outcome {
        match Url::parse_user_input(input) {
            Ok(url) => self.start(url),
            Err(e) => self.fail(e),
        }
    }

    /// Continue the current navigation at a redirect target, keeping the
    /// redirect count and chain.
    pub fn follow_redirect(&mut self, target: &str) -> Outcome {
        match self.resolve(target) {
            Ok(url) => self.run(url),
            Err(e) => self.fail(e),
        }
    }

    /// Follow link `index` of the current page, asking for input first
    /// when the link needs it.
    pub fn visit_link(&mut self, index: i64) -> Outcome {
        let link = match self.links.get(index) {
            Ok(link) => link.clone(),
            Err(e) => return self.fail(e),
        };
        if link.needs_input {
            let prompt = format!("Input for {}", link.url);
            return match self.prompter.read_input(&prompt, false) {
                Some(text) => self.submit_input(index, &text),
                None => Outcome::Cancelled,
            };
        }
        match Url::parse(&link.url) {
            Ok(url) => self.start(url),
            Err(e) => self.fail(e),
        }
    }

    /// Send `text` to link `index` as its query.
    pub fn submit_input(&mut self, index: i64, text: &str) -> Outcome {
        let url = self
            .links
            .get(index)
            .and_then(|link| Url::parse(&link.url));
        match url {
            Ok(url) => self.start(url.with_query(&percent_encode(text))),
            Err(e) => self.fail(e),
        }
    }

    /// Return to the previous page. History is only rewound once that
    /// page is displayed.
    pub fn go_back(&mut self) -> Outcome {
        let Some(current) = self.history.current().map(str::to_string) else {
            return Outcome::Idle;
        };
        let Some(url) = self.history.go_back().map(str::to_string) else {
            return Outcome::Idle;
        };
        let outcome = self.navigate_url(&url);
        if !matches!(outcome, Outcome::Displayed) {
            self.history.push(&current);
        }
        outcome
    }

    /// Revisit history entry `index` (1-based, negative from the end).
    pub fn visit_history(&mut self, index: i64) -> Outcome {
        match self.history.get(index).map(str::to_string) {
            Ok(url) => self.navigate_url(&url),
            Err(e) => self.fail(e),
        }
    }

    /// Fetch the current page again.
    pub fn reload(&mut self) -> Outcome {
        let Some(url) = self.history.current().map(str::to_string) else {
            return Outcome::Idle;
        };
        self.navigate_url(&url)
    }

    /// Visit the next tour entry. The cursor moves on only once the entry
    /// is displayed, so a failed entry is tried again next time.
    pub fn tour_next(&mut self) -> Outcome {
        let Some(url) = self.tour.upcoming().map(str::to_string) else {
            return Outcome::Idle;
        };
        let outcome = self.navigate_url(&url);
        if matches!(outcome, Outcome::Displayed) {
            self.tour.advance();
        }
        outcome
    }

    /// Visit tour entry `index`; once it is displayed the tour continues
    /// after it.
    pub fn tour_jump(&mut self, index: i64) -> Outcome {
        let url = match self.tour.get(index) {
            Ok(url) => url.to_string(),
            Err(e) => return self.fail(e),
        };
        let outcome = self.navigate_url(&url);
        if matches!(outcome, Outcome::Displayed) {
            // The index was valid a moment ago and the tour is unchanged.
            let _ = self.tour.jump(index);
        }
        outcome
    }

    /// Add the selected links of the current page to the tour. Returns
    /// how many were added.
    pub fn tour_add(&mut self, selection: &str) -> Result<usize> {
        let picked = parse_selection(selection, self.links.len())?;
        for n in &picked {
            let link = self.links.get(*n as i64)?;
            self.tour.push(link.url.clone());
        }
        Ok(picked.len())
    }

    /// Query the configured search engine.
    pub fn search(&mut self, query: &str) -> Outcome {
        match Url::parse(&self.config.search_url) {
            Ok(url) => self.start(url.with_query(&percent_encode(query))),
            Err(e) => self.fail(e),
        }
    }

    // -----------------------------------------------------------------------
    // State accessors
    // -----------------------------------------------------------------------

    /// The page on screen, for redisplay without a fetch.
    pub fn last_rendered(&self) -> Option<&RenderedPage> {
        self.last.as_ref()
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tour(&self) -> &TourList {
        &self.tour
    }

    pub fn tour_mut(&mut self) -> &mut TourList {
        &mut self.tour
    }

    pub fn redirect_chain(&self) -> &RedirectChain {
        self.redirects.chain()
    }

    // -----------------------------------------------------------------------
    // Transaction loop
    // -----------------------------------------------------------------------

    fn navigate_url(&mut self, url: &str) -> Outcome {
        match Url::parse(url) {
            Ok(url) => self.start(url),
            Err(e) => self.fail(e),
        }
    }

    fn start(&mut self, url: Url) -> Outcome {
        self.redirects.begin();
        self.run(url)
    }

    fn resolve(&self, target: &str) -> Result<Url> {
        match self.history.current() {
            Some(current) => Url::parse(current)?.resolve(target),
            None => Url::parse_user_input(target),
        }
    }

    /// Request `url`, answering input prompts and following redirects,
    /// until a page is displayed or the navigation ends.
    fn run(&mut self, mut url: Url) -> Outcome {
        loop {
            let response = match Protocol::for_url(&url)
                .and_then(|p| p.fetch(&url, &self.connector, self.config.max_body_bytes))
            {
                Ok(response) => response,
                Err(e) => return self.fail(e),
            };

            match response.status {
                Status::Success => return self.display(response),
                Status::Input { sensitive } => {
                    let prompt = if response.meta.is_empty() {
                        "Input"
                    } else {
                        response.meta.as_str()
                    };
                    let Some(text) = self.prompter.read_input(prompt, sensitive) else {
                        return Outcome::Cancelled;
                    };
                    url = url.with_query(&percent_encode(&text));
                },
                Status::Redirect { .. } => {
                    let target = match url.resolve(&response.meta) {
                        Ok(target) => target,
                        Err(e) => return self.fail(e),
                    };
                    let target_str = target.to_string();
                    match self.redirects.on_redirect(&target_str) {
                        Decision::Follow => {},
                        Decision::Prompt => {
                            let chain = if self.config.show_redirect_chain {
                                self.redirects.chain().entries()
                            } else {
                                Vec::new()
                            };
                            if !self.prompter.confirm_redirect(&target_str, &chain) {
                                log::debug!("redirect to {target_str} declined");
                                self.redirects.begin();
                                return Outcome::Cancelled;
                            }
                            self.redirects.confirm();
                        },
                        Decision::Abort => {
                            let e = self.redirects.loop_error();
                            return self.fail(e);
                        },
                    }
                    url = target;
                },
                Status::TemporaryFailure
                | Status::PermanentFailure
                | Status::ClientCertificateRequired => {
                    log::debug!("{url}: status {} {:?}", response.code, response.meta);
                    return Outcome::Failure {
                        code: response.code,
                        message: response.meta,
                    };
                },
            }
        }
    }

    /// Render a success response and install it as the current page.
    fn display(&mut self, response: Response) -> Outcome {
        let rendered = match Page::from_response(response).and_then(|page| self.render_page(&page)) {
            Ok(rendered) => rendered,
            Err(e) => return self.fail(e),
        };
        self.history.push(&rendered.url.to_string());
        self.links = rendered.links.clone();
        self.last = Some(rendered);
        Outcome::Displayed
    }

    fn fail(&self, e: NavError) -> Outcome {
        log::warn!("navigation failed: {e}");
        Outcome::Error(e)
    }
}
