//! Media types from response meta lines.
//!
//! Parsing follows RFC 2045 tokens: `type/subtype` followed by
//! `; name=value` parameters, where values may be quoted. A bare type
//! without a subtype (`foobar`) is accepted as-is. A malformed type is an
//! error; malformed parameters are dropped and the type is kept.

use std::collections::BTreeMap;
use std::fmt;

use smolnav_types::error::{NavError, Result};

/// Media type of gemtext documents.
pub const GEMTEXT: &str = "text/gemini";
/// Nex directory listings.
pub const NEX_DIRECTORY: &str = "text/x-nex-directory";
/// Gopher menus (item types `1` and `7`).
pub const GOPHER_MENU: &str = "application/gopher-menu";
/// Opaque binary content.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A parsed media type with lower-cased type and parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    params: BTreeMap<String, String>,
}

impl MediaType {
    /// A media type with no parameters. `essence` must already be valid.
    pub fn new(essence: &str) -> Self {
        Self {
            essence: essence.to_ascii_lowercase(),
            params: BTreeMap::new(),
        }
    }

    /// `text/gemini; charset=utf-8`, the default for an empty meta.
    pub fn gemtext() -> Self {
        let mut media = Self::new(GEMTEXT);
        media
            .params
            .insert("charset".to_string(), "utf-8".to_string());
        media
    }

    /// Parse a Gemini success meta. Empty meta means gemtext.
    pub fn parse(meta: &str) -> Result<Self> {
        let meta = meta.trim();
        if meta.is_empty() {
            return Ok(Self::gemtext());
        }

        let (head, rest) = match meta.find(';') {
            Some(i) => (&meta[..i], &meta[i..]),
            None => (meta, ""),
        };
        let essence = head.trim().to_ascii_lowercase();
        check_essence(&essence).map_err(|reason| NavError::MediaType {
            meta: meta.to_string(),
            reason: reason.to_string(),
        })?;

        let params = match parse_params(rest) {
            Ok(params) => params,
            Err(reason) => {
                log::warn!("dropping parameters of {meta:?}: {reason}");
                BTreeMap::new()
            },
        };

        Ok(Self { essence, params })
    }

    /// `type/subtype`, lower-cased.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// The top-level type (`text` for `text/plain`).
    pub fn top_level(&self) -> &str {
        self.essence
            .split_once('/')
            .map_or(self.essence.as_str(), |(top, _)| top)
    }

    pub fn is_text(&self) -> bool {
        self.top_level() == "text"
    }

    /// Value of parameter `name` (case-insensitive name).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)?;
        for (name, value) in &self.params {
            if !value.is_empty() && value.bytes().all(is_token_byte) {
                write!(f, "; {name}={value}")?;
            } else {
                write!(f, "; {name}=\"{}\"", value.replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

/// Parse a response meta into a [`MediaType`].
pub fn parse_meta(meta: &str) -> Result<MediaType> {
    MediaType::parse(meta)
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

fn is_token_byte(b: u8) -> bool {
    b > 0x20 && b < 0x7f && !b"()<>@,;:\\\"/[]?=".contains(&b)
}

/// Split a leading token off `s`.
fn consume_token(s: &str) -> (&str, &str) {
    let end = s.bytes().position(|b| !is_token_byte(b)).unwrap_or(s.len());
    s.split_at(end)
}

fn check_essence(essence: &str) -> std::result::Result<(), &'static str> {
    let (top, rest) = consume_token(essence);
    if top.is_empty() {
        return Err("no media type");
    }
    if rest.is_empty() {
        return Ok(());
    }
    let Some(rest) = rest.strip_prefix('/') else {
        return Err("expected slash after first token");
    };
    let (sub, rest) = consume_token(rest);
    if sub.is_empty() {
        return Err("expected token after slash");
    }
    if !rest.is_empty() {
        return Err("unexpected content after media subtype");
    }
    Ok(())
}

/// Parse `; name=value` pairs. A lone trailing `;` is allowed.
fn parse_params(mut rest: &str) -> std::result::Result<BTreeMap<String, String>, &'static str> {
    let mut params = BTreeMap::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(params);
        }
        let Some(after) = rest.strip_prefix(';') else {
            return Err("expected ';' before parameter");
        };
        let after = after.trim_start();
        if after.is_empty() {
            return Ok(params);
        }

        let (name, after) = consume_token(after);
        if name.is_empty() {
            return Err("missing parameter name");
        }
        let Some(after) = after.trim_start().strip_prefix('=') else {
            return Err("missing '=' after parameter name");
        };
        let (value, after) = consume_value(after.trim_start())?;

        let name = name.to_ascii_lowercase();
        if params.contains_key(&name) {
            return Err("duplicate parameter name");
        }
        params.insert(name, value);
        rest = after;
    }
}

/// A parameter value: a token or a quoted string with `\` escapes.
fn consume_value(s: &str) -> std::result::Result<(String, &str), &'static str> {
    let Some(quoted) = s.strip_prefix('"') else {
        let (token, rest) = consume_token(s);
        if token.is_empty() {
            return Err("missing parameter value");
        }
        return Ok((token.to_string(), rest));
    };

    let mut value = String::new();
    let mut chars = quoted.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &quoted[i + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped)) => value.push(escaped),
                None => break,
            },
            '\r' | '\n' => break,
            c => value.push(c),
        }
    }
    Err("unterminated quoted string")
}
