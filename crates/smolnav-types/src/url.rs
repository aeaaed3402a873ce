//! URL parsing and resolution (simplified RFC 3986).
//!
//! Small-internet URLs are simple: a scheme, an authority, a path and an
//! optional query. This parser handles those plus the scheme-only forms
//! (`mailto:`, `about:`) that show up as link targets in gemtext.

use std::fmt;

use crate::error::{NavError, Result};

/// A parsed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    /// Lower-cased scheme (e.g. `"gemini"`, `"spartan"`).
    pub scheme: String,
    /// Host component. Empty for URLs without an authority.
    pub host: String,
    /// Optional explicit port number.
    pub port: Option<u16>,
    /// Path component. `/` when an authority URL had none; may be empty
    /// for opaque URLs.
    pub path: String,
    /// Optional query string (without the leading `?`).
    pub query: Option<String>,
    /// Optional fragment (without the leading `#`).
    pub fragment: Option<String>,
    /// `true` for `scheme://authority...`, `false` for `scheme:opaque`.
    pub has_authority: bool,
}

impl Url {
    /// Parse an absolute URL string.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(NavError::InvalidUrl("empty URL".to_string()));
        }

        let scheme_len = scheme_length(url)
            .ok_or_else(|| NavError::InvalidUrl(format!("{url}: missing scheme")))?;
        let scheme = url[..scheme_len].to_ascii_lowercase();
        let rest = &url[scheme_len + 1..];

        match rest.strip_prefix("//") {
            Some(rest) => Self::parse_authority_and_path(&scheme, rest),
            None => {
                let (path, query, fragment) = split_path_query_fragment(rest);
                Ok(Url {
                    scheme,
                    host: String::new(),
                    port: None,
                    path,
                    query,
                    fragment,
                    has_authority: false,
                })
            },
        }
    }

    /// Parse something a user typed at the prompt.
    ///
    /// Input without a scheme (`example.org/page`) is taken to be a Gemini
    /// address.
    pub fn parse_user_input(input: &str) -> Result<Self> {
        let input = input.trim();
        match Url::parse(input) {
            Ok(url) if url.has_authority && !url.host.is_empty() => Ok(url),
            _ => Url::parse(&format!("gemini://{input}")),
        }
    }

    /// Parse `host[:port]/path?query#fragment` after `scheme://`.
    fn parse_authority_and_path(scheme: &str, rest: &str) -> Result<Url> {
        let (rest, fragment) = match rest.find('#') {
            Some(i) => (&rest[..i], Some(rest[i + 1..].to_string())),
            None => (rest, None),
        };

        let (rest, query) = match rest.find('?') {
            Some(i) => (&rest[..i], Some(rest[i + 1..].to_string())),
            None => (rest, None),
        };

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        // Userinfo is never meaningful for these protocols.
        let authority = authority.rsplit('@').next().unwrap_or(authority);

        let (host, port) = match authority.rfind(':') {
            Some(i) if !authority[i + 1..].contains(']') => {
                let maybe_port = &authority[i + 1..];
                if maybe_port.is_empty() {
                    (&authority[..i], None)
                } else {
                    let port = maybe_port.parse::<u16>().map_err(|_| {
                        NavError::InvalidUrl(format!("{scheme}://{rest}: bad port {maybe_port:?}"))
                    })?;
                    (&authority[..i], Some(port))
                }
            },
            _ => (authority, None),
        };

        Ok(Url {
            scheme: scheme.to_string(),
            host: host.to_ascii_lowercase(),
            port,
            path: path.to_string(),
            query,
            fragment,
            has_authority: true,
        })
    }

    /// Resolve a reference against this base URL.
    ///
    /// Handles absolute URLs (returned as parsed), scheme-relative
    /// (`//host/path`), absolute paths (`/path`), relative paths (`path`,
    /// `../path`), query-only (`?q=x`) and fragment-only (`#frag`)
    /// references.
    pub fn resolve(&self, reference: &str) -> Result<Url> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(self.clone());
        }

        if scheme_length(reference).is_some() {
            return Url::parse(reference);
        }

        if reference.starts_with("//") {
            return Url::parse(&format!("{}:{}", self.scheme, reference));
        }

        if let Some(frag) = reference.strip_prefix('#') {
            let mut resolved = self.clone();
            resolved.fragment = Some(frag.to_string());
            return Ok(resolved);
        }

        if let Some(query) = reference.strip_prefix('?') {
            let (_, query, fragment) = split_path_query_fragment(&format!("?{query}"));
            let mut resolved = self.clone();
            resolved.query = query;
            resolved.fragment = fragment;
            return Ok(resolved);
        }

        let (ref_path, query, fragment) = split_path_query_fragment(reference);
        let path = if ref_path.starts_with('/') {
            remove_dot_segments("/", &ref_path)
        } else {
            remove_dot_segments(self.directory(), &ref_path)
        };

        Ok(Url {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
            path,
            query,
            fragment,
            has_authority: self.has_authority,
        })
    }

    /// Directory portion of the path, up to and including the last `/`.
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..=i],
            None => "/",
        }
    }

    /// `host` or `host:port`, as written in the URL.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        }
    }

    /// The port to connect to, falling back to the protocol default.
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }

    /// Copy of this URL with the query replaced and fragment dropped.
    pub fn with_query(&self, query: &str) -> Url {
        let mut url = self.clone();
        url.query = Some(query.to_string());
        url.fragment = None;
        url
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_authority {
            write!(f, "{}://{}", self.scheme, self.authority())?;
        } else {
            write!(f, "{}:", self.scheme)?;
        }
        write!(f, "{}", self.path)?;
        if let Some(ref q) = self.query {
            write!(f, "?{q}")?;
        }
        if let Some(ref frag) = self.fragment {
            write!(f, "#{frag}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Url {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self> {
        Url::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Length of a valid leading `scheme:` (excluding the colon), if any.
fn scheme_length(s: &str) -> Option<usize> {
    let colon = s.find(':')?;
    let scheme = &s[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(colon)
    } else {
        None
    }
}

/// Split a (possibly relative) reference into `(path, query, fragment)`.
fn split_path_query_fragment(s: &str) -> (String, Option<String>, Option<String>) {
    let (s, fragment) = match s.find('#') {
        Some(i) => (&s[..i], Some(s[i + 1..].to_string())),
        None => (s, None),
    };
    let (path, query) = match s.find('?') {
        Some(i) => (s[..i].to_string(), Some(s[i + 1..].to_string())),
        None => (s.to_string(), None),
    };
    (path, query, fragment)
}

/// Merge `relative` onto `base_dir` and drop `.`/`..` segments.
///
/// A trailing slash on the reference (or a trailing dot segment) is kept,
/// so directory URLs stay directories.
fn remove_dot_segments(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    let mut trailing_slash = false;

    for seg in relative.split('/') {
        trailing_slash = false;
        match seg {
            "" => trailing_slash = true,
            "." => trailing_slash = true,
            ".." => {
                segments.pop();
                trailing_slash = true;
            },
            s => segments.push(s),
        }
    }

    let mut path = format!("/{}", segments.join("/"));
    if trailing_slash && !path.ends_with('/') {
        path.push('/');
    }
    path
}

// ---------------------------------------------------------------------------
// Percent encoding
// ---------------------------------------------------------------------------

/// Percent-encode user input for use as a query string.
///
/// Everything but RFC 3986 unreserved characters is escaped, spaces
/// included (`%20`, never `+`).
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Decode `%XX` escapes. Malformed escapes are an error.
pub fn percent_decode(input: &str) -> Result<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| NavError::InvalidUrl(format!("bad percent escape in {input:?}")))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out)
        .map_err(|_| NavError::InvalidUrl(format!("query is not UTF-8: {input:?}")))
}
