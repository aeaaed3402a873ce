//! Navigation state: link table, visit history, tour list.
//!
//! All three are addressed with 1-based indexes the way users type them.
//! Non-positive indexes count from the end: `-1` is the last entry, `0`
//! names nothing.

use smolnav_types::error::{NavError, Result};

/// Map a user index onto a 0-based position in a list of `len` entries.
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len_i = i64::try_from(len).ok()?;
    let pos = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => len_i + i,
    };
    (0..len_i).contains(&pos).then_some(pos as usize)
}

fn out_of_range(index: i64, len: usize) -> NavError {
    NavError::IndexOutOfRange { index, len }
}

// ---------------------------------------------------------------------------
// Link table
// ---------------------------------------------------------------------------

/// A link found while rendering a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute URL.
    pub url: String,
    /// Following this link asks the user for input first (Spartan `=:`
    /// lines, Gopher search items).
    pub needs_input: bool,
}

/// Links of the displayed page, numbered 1..N in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTable {
    links: Vec<Link>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link and return its 1-based number.
    pub fn push(&mut self, url: impl Into<String>, needs_input: bool) -> usize {
        self.links.push(Link {
            url: url.into(),
            needs_input,
        });
        self.links.len()
    }

    pub fn get(&self, index: i64) -> Result<&Link> {
        resolve_index(index, self.links.len())
            .map(|pos| &self.links[pos])
            .ok_or_else(|| out_of_range(index, self.links.len()))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// URLs of displayed pages, oldest first. The tail is the current page.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit. Returns `false` when `url` is already the current
    /// entry, in which case nothing is recorded.
    pub fn push(&mut self, url: &str) -> bool {
        if self.current() == Some(url) {
            return false;
        }
        self.entries.push(url.to_string());
        true
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Drop the current entry and return the one before it. Nothing is
    /// removed when there is no earlier entry.
    pub fn go_back(&mut self) -> Option<&str> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop();
        self.current()
    }

    pub fn get(&self, index: i64) -> Result<&str> {
        resolve_index(index, self.entries.len())
            .map(|pos| self.entries[pos].as_str())
            .ok_or_else(|| out_of_range(index, self.entries.len()))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tour
// ---------------------------------------------------------------------------

/// A queue of URLs to visit in order, with a cursor on the next one.
#[derive(Debug, Clone, Default)]
pub struct TourList {
    entries: Vec<String>,
    next: usize,
}

impl TourList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, url: impl Into<String>) {
        self.entries.push(url.into());
    }

    /// The entry under the cursor.
    pub fn upcoming(&self) -> Option<&str> {
        self.entries.get(self.next).map(String::as_str)
    }

    /// Move the cursor past the entry under it.
    pub fn advance(&mut self) {
        if self.next < self.entries.len() {
            self.next += 1;
        }
    }

    pub fn get(&self, index: i64) -> Result<&str> {
        resolve_index(index, self.entries.len())
            .map(|pos| self.entries[pos].as_str())
            .ok_or_else(|| out_of_range(index, self.entries.len()))
    }

    /// Put the cursor just past entry `index`.
    pub fn jump(&mut self, index: i64) -> Result<()> {
        let pos = resolve_index(index, self.entries.len())
            .ok_or_else(|| out_of_range(index, self.entries.len()))?;
        self.next = pos + 1;
        Ok(())
    }

    /// Remove everything. Returns how many entries there were.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.next = 0;
        removed
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// 0-based position of the next entry to visit.
    pub fn cursor(&self) -> usize {
        self.next
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a link selection into 1-based link numbers.
///
/// The selection is a whitespace-separated list of terms: `*` or `all`, a
/// single index (`3`, `-1`), or an inclusive range `a,b` where either end
/// may be omitted (`,5`, `3,`). Reversed ranges are normalised. Terms are
/// expanded in the order given; `len` is the number of links available.
pub fn parse_selection(arg: &str, len: usize) -> Result<Vec<usize>> {
    let mut picked = Vec::new();
    for term in arg.split_whitespace() {
        picked.extend(parse_term(term, len)?);
    }
    if picked.is_empty() && len > 0 {
        return Err(NavError::Config(format!("bad link selection {arg:?}")));
    }
    Ok(picked)
}

fn parse_term(arg: &str, len: usize) -> Result<Vec<usize>> {
    let bad = || NavError::Config(format!("bad link selection {arg:?}"));

    if arg == "*" || arg.eq_ignore_ascii_case("all") {
        return Ok((1..=len).collect());
    }

    let bound = |s: &str, default: usize| -> Result<usize> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(default);
        }
        let index: i64 = s.parse().map_err(|_| bad())?;
        resolve_index(index, len)
            .map(|pos| pos + 1)
            .ok_or_else(|| out_of_range(index, len))
    };

    match arg.split_once(',') {
        Some((start, end)) => {
            if len == 0 {
                return Err(out_of_range(1, 0));
            }
            let a = bound(start, 1)?;
            let b = bound(end, len)?;
            Ok((a.min(b)..=a.max(b)).collect())
        },
        None => Ok(vec![bound(arg, 1)?]),
    }
}
