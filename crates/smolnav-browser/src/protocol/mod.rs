//! Protocol transactions.
//!
//! Every supported protocol is one request followed by one response on a
//! fresh connection. The per-protocol modules send the request and parse
//! whatever header the protocol has; the result is normalised into a
//! single [`Response`] so the session never has to care which protocol
//! produced it.

pub mod gemini;
pub mod gopher;
pub mod nex;
pub mod spartan;

use std::fmt;
use std::io::{self, BufRead, Read};

use smolnav_net::Connector;
use smolnav_types::Url;
use smolnav_types::error::{NavError, Result};

/// Longest header line accepted: two status digits, a space, 1024 bytes of
/// meta and CRLF.
pub(crate) const MAX_HEADER_LEN: u64 = 1029;

/// A small-internet protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Gemini,
    Spartan,
    Nex,
    Gopher,
}

impl Protocol {
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "gemini" => Some(Protocol::Gemini),
            "spartan" => Some(Protocol::Spartan),
            "nex" => Some(Protocol::Nex),
            "gopher" => Some(Protocol::Gopher),
            _ => None,
        }
    }

    /// The protocol that serves `url`.
    pub fn for_url(url: &Url) -> Result<Self> {
        Self::from_scheme(&url.scheme)
            .ok_or_else(|| NavError::UnsupportedScheme(url.scheme.clone()))
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Gemini => "gemini",
            Protocol::Spartan => "spartan",
            Protocol::Nex => "nex",
            Protocol::Gopher => "gopher",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Gemini => gemini::DEFAULT_PORT,
            Protocol::Spartan => spartan::DEFAULT_PORT,
            Protocol::Nex => nex::DEFAULT_PORT,
            Protocol::Gopher => gopher::DEFAULT_PORT,
        }
    }

    /// Run one transaction for `url`.
    ///
    /// The connection is closed before this returns, on every path. Bodies
    /// are only read for successful responses and are capped at
    /// `max_body` bytes.
    pub fn fetch(self, url: &Url, connector: &Connector, max_body: usize) -> Result<Response> {
        if url.host.is_empty() {
            return Err(NavError::InvalidUrl(format!("{url}: missing host")));
        }
        log::debug!("{} request for {url}", self.scheme());
        let response = match self {
            Protocol::Gemini => gemini::fetch(url, connector, max_body),
            Protocol::Spartan => spartan::fetch(url, connector, max_body),
            Protocol::Nex => nex::fetch(url, connector, max_body),
            Protocol::Gopher => gopher::fetch(url, connector, max_body),
        }?;
        log::debug!(
            "{} response {} {:?} ({} bytes)",
            self.scheme(),
            response.code,
            response.meta,
            response.body.len()
        );
        Ok(response)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status group of a response, shared by all protocols.
///
/// Groups follow Gemini's tens digit. Spartan statuses map onto them
/// (`4` client error is a permanent failure, `5` server error a temporary
/// one); Nex and Gopher responses are always [`Status::Success`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 10-19: the server wants a line of input.
    Input { sensitive: bool },
    /// 20-29: body follows; meta is its media type.
    Success,
    /// 30-39: meta is the new location.
    Redirect { permanent: bool },
    /// 40-49.
    TemporaryFailure,
    /// 50-59.
    PermanentFailure,
    /// 60-69: client certificates are not supported.
    ClientCertificateRequired,
}

impl Status {
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    pub fn is_redirect(self) -> bool {
        matches!(self, Status::Redirect { .. })
    }
}

/// A normalised protocol response.
#[derive(Debug, Clone)]
pub struct Response {
    pub protocol: Protocol,
    /// The URL that was requested.
    pub url: Url,
    /// Raw numeric status as sent (`20` for header-less protocols).
    pub code: u8,
    pub status: Status,
    /// Media type, redirect target, prompt or error message, by status.
    pub meta: String,
    pub body: Vec<u8>,
    /// The body was cut short by a read error, timeout or size cap.
    pub partial: bool,
}

impl Response {
    /// A header-less success response (Nex, Gopher).
    pub(crate) fn success(
        protocol: Protocol,
        url: &Url,
        media_type: &str,
        (body, partial): (Vec<u8>, bool),
    ) -> Self {
        Self {
            protocol,
            url: url.clone(),
            code: 20,
            status: Status::Success,
            meta: media_type.to_string(),
            body,
            partial,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared reading helpers
// ---------------------------------------------------------------------------

/// Read a `\n`-terminated header line, returning it without the line
/// terminator.
pub(crate) fn read_header_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    reader
        .take(MAX_HEADER_LEN)
        .read_until(b'\n', &mut buf)
        .map_err(|e| NavError::Protocol(format!("reading response header: {e}")))?;

    if buf.is_empty() {
        return Err(NavError::Protocol("empty response header".to_string()));
    }
    if buf.last() != Some(&b'\n') {
        return Err(NavError::Protocol(if buf.len() as u64 >= MAX_HEADER_LEN {
            "response header too long".to_string()
        } else {
            "stream closed before end of response header".to_string()
        }));
    }
    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf).map_err(|_| NavError::Protocol("response header is not UTF-8".to_string()))
}

/// Read the rest of the stream, best effort.
///
/// Read errors and the size cap end the body early and mark it partial;
/// they are never fatal.
pub(crate) fn read_body<R: Read>(reader: &mut R, max: usize) -> (Vec<u8>, bool) {
    let mut body = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return (body, false),
            Ok(n) => {
                if body.len() + n > max {
                    body.extend_from_slice(&chunk[..max - body.len()]);
                    log::warn!("response body truncated at {max} bytes");
                    return (body, true);
                }
                body.extend_from_slice(&chunk[..n]);
            },
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // TLS peers that skip close_notify end the stream this way.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return (body, false),
            Err(e) => {
                log::warn!("response body cut short after {} bytes: {e}", body.len());
                return (body, true);
            },
        }
    }
}
