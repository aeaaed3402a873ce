//! Redirect policy.
//!
//! A [`RedirectController`] is consulted once per redirect received during
//! a top-level navigation and answers follow, prompt or abort. It keeps a
//! rolling [`RedirectChain`] of the latest targets for display.

use std::collections::VecDeque;

use smolnav_types::error::NavError;

/// Redirects followed without a confirmation before the navigation is
/// abandoned, whatever the configured limit.
pub const HARD_CEILING: usize = 20;

/// Chain capacity when the limit does not give one.
pub const FALLBACK_CAPACITY: usize = 10;

/// The latest redirect targets of a navigation, oldest first.
#[derive(Debug, Clone)]
pub struct RedirectChain {
    entries: VecDeque<String>,
    capacity: usize,
    total: usize,
}

impl RedirectChain {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    /// Record a target, evicting the oldest one when full.
    pub fn push(&mut self, target: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(target.into());
        self.total += 1;
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Redirects seen since the last [`reset`](Self::reset).
    pub fn total(&self) -> usize {
        self.total
    }

    /// Older targets were evicted or cleared.
    pub fn is_truncated(&self) -> bool {
        self.total > self.entries.len()
    }

    /// Forget the retained targets but keep counting.
    pub fn clear_window(&mut self) {
        self.entries.clear();
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.total = 0;
    }
}

/// What to do with a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Follow,
    /// Ask the user; follow only if they confirm.
    Prompt,
    /// Give up with [`NavError::RedirectLoop`].
    Abort,
}

/// Decides follow, prompt or abort for each redirect of a navigation.
///
/// `limit < 0` follows silently, `limit == 0` prompts every time, and
/// `limit == N` prompts after every N consecutive redirects. In all cases
/// [`HARD_CEILING`] unconfirmed redirects abort.
#[derive(Debug, Clone)]
pub struct RedirectController {
    limit: i32,
    since_confirm: usize,
    chain: RedirectChain,
}

impl RedirectController {
    pub fn new(limit: i32) -> Self {
        let capacity = match usize::try_from(limit) {
            Ok(n) if n > 0 => n,
            _ => FALLBACK_CAPACITY,
        };
        Self {
            limit,
            since_confirm: 0,
            chain: RedirectChain::with_capacity(capacity),
        }
    }

    /// Start a fresh top-level navigation.
    pub fn begin(&mut self) {
        self.since_confirm = 0;
        self.chain.reset();
    }

    /// Record redirect target `target` and decide what to do with it.
    pub fn on_redirect(&mut self, target: &str) -> Decision {
        self.since_confirm += 1;
        self.chain.push(target);
        log::debug!(
            "redirect {} ({} since confirmation) to {target}",
            self.chain.total(),
            self.since_confirm
        );

        if self.since_confirm >= HARD_CEILING {
            return Decision::Abort;
        }
        match usize::try_from(self.limit) {
            Err(_) => Decision::Follow,
            Ok(0) => Decision::Prompt,
            Ok(n) if self.since_confirm >= n => Decision::Prompt,
            Ok(_) => Decision::Follow,
        }
    }

    /// The user allowed the redirect: open a fresh window.
    pub fn confirm(&mut self) {
        self.since_confirm = 0;
        self.chain.clear_window();
    }

    pub fn chain(&self) -> &RedirectChain {
        &self.chain
    }

    /// The error reported when a navigation is aborted.
    pub fn loop_error(&self) -> NavError {
        NavError::RedirectLoop {
            count: self.chain.total(),
            chain: self.chain.entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(controller: &mut RedirectController, redirects: usize) -> Vec<Decision> {
        let mut decisions = Vec::new();
        for i in 0..redirects {
            let decision = controller.on_redirect(&format!("gemini://h/{i}"));
            decisions.push(decision);
            match decision {
                Decision::Prompt => controller.confirm(),
                Decision::Abort => break,
                Decision::Follow => {},
            }
        }
        decisions
    }

    #[test]
    fn chain_is_a_sliding_window() {
        let mut chain = RedirectChain::with_capacity(3);
        for i in 0..5 {
            chain.push(format!("u{i}"));
        }
        assert_eq!(chain.entries(), ["u2", "u3", "u4"]);
        assert_eq!(chain.total(), 5);
        assert!(chain.is_truncated());
        chain.reset();
        assert!(chain.is_empty());
        assert_eq!(chain.total(), 0);
    }

    #[test]
    fn capacity_from_limit() {
        assert_eq!(RedirectController::new(4).chain().capacity(), 4);
        assert_eq!(RedirectController::new(0).chain().capacity(), FALLBACK_CAPACITY);
        assert_eq!(RedirectController::new(-1).chain().capacity(), FALLBACK_CAPACITY);
    }

    #[test]
    fn limit_n_prompts_every_n() {
        let mut c = RedirectController::new(2);
        let decisions = run(&mut c, 4);
        assert_eq!(
            decisions,
            [Decision::Follow, Decision::Prompt, Decision::Follow, Decision::Prompt]
        );
    }

    #[test]
    fn limit_zero_prompts_always() {
        let mut c = RedirectController::new(0);
        assert!(run(&mut c, 30).iter().all(|d| *d == Decision::Prompt));
    }

    #[test]
    fn negative_limit_hits_ceiling() {
        let mut c = RedirectController::new(-1);
        let decisions = run(&mut c, 25);
        assert_eq!(decisions.len(), HARD_CEILING);
        assert_eq!(decisions.last(), Some(&Decision::Abort));
        assert!(decisions[..HARD_CEILING - 1].iter().all(|d| *d == Decision::Follow));

        match c.loop_error() {
            NavError::RedirectLoop { count, chain } => {
                assert_eq!(count, HARD_CEILING);
                assert_eq!(chain.len(), FALLBACK_CAPACITY);
                assert_eq!(chain.last().map(String::as_str), Some("gemini://h/19"));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn large_limit_still_capped() {
        let mut c = RedirectController::new(50);
        let decisions = run(&mut c, 30);
        assert_eq!(decisions.len(), HARD_CEILING);
        assert_eq!(decisions.last(), Some(&Decision::Abort));
    }

    #[test]
    fn confirmation_clears_window() {
        let mut c = RedirectController::new(2);
        c.on_redirect("a");
        assert_eq!(c.on_redirect("b"), Decision::Prompt);
        assert_eq!(c.chain().entries(), ["a", "b"]);
        c.confirm();
        assert!(c.chain().is_empty());
        assert_eq!(c.chain().total(), 2);
        c.begin();
        assert_eq!(c.chain().total(), 0);
    }
}
