//! Spartan: plain TCP, `<host> <path> <len>\r\n<upload>` request,
//! `<digit> <meta>\r\n` header.
//!
//! The URL query, percent-decoded, is the upload. Spartan has no input
//! status; input is requested by `=:` lines in gemtext instead.

use std::io::{BufReader, Write};

use smolnav_net::Connector;
use smolnav_types::Url;
use smolnav_types::error::{NavError, Result};
use smolnav_types::url::percent_decode;

use super::{Protocol, Response, Status, read_body, read_header_line};

pub const DEFAULT_PORT: u16 = 300;

impl Status {
    /// Classify a Spartan status digit.
    pub fn from_spartan(digit: u8) -> Option<Self> {
        match digit {
            2 => Some(Status::Success),
            3 => Some(Status::Redirect { permanent: false }),
            4 => Some(Status::PermanentFailure),
            5 => Some(Status::TemporaryFailure),
            _ => None,
        }
    }
}

/// The request for `url`: request line followed by the upload.
pub fn build_request(url: &Url) -> Result<Vec<u8>> {
    let path = if url.path.is_empty() { "/" } else { &url.path };
    let upload = match &url.query {
        Some(q) => percent_decode(q)?,
        None => String::new(),
    };
    let mut request = format!("{} {path} {}\r\n", url.host, upload.len()).into_bytes();
    request.extend_from_slice(upload.as_bytes());
    Ok(request)
}

/// Parse a header line into status digit, status and meta.
pub fn parse_header(line: &str) -> Result<(u8, Status, String)> {
    let (digit, meta) = match line.split_once(' ') {
        Some((digit, meta)) => (digit, meta),
        None => (line, ""),
    };
    let code: u8 = match digit.as_bytes() {
        [d] if d.is_ascii_digit() => d - b'0',
        _ => return Err(NavError::Protocol(format!("bad Spartan status in {line:?}"))),
    };
    let status = Status::from_spartan(code)
        .ok_or_else(|| NavError::Protocol(format!("unknown Spartan status {code}")))?;
    Ok((code, status, meta.trim().to_string()))
}

pub(crate) fn fetch(url: &Url, connector: &Connector, max_body: usize) -> Result<Response> {
    let request = build_request(url)?;
    let mut conn = connector.connect(&url.host, url.port_or(DEFAULT_PORT))?;
    conn.write_all(&request)
        .and_then(|()| conn.flush())
        .map_err(|e| NavError::Connection(format!("sending request to {}: {e}", conn.peer())))?;

    let mut reader = BufReader::new(conn);
    let header = read_header_line(&mut reader)?;
    let (code, status, mut meta) = parse_header(&header)?;

    let (body, partial) = match status {
        Status::Success => read_body(&mut reader, max_body),
        _ => (Vec::new(), false),
    };
    reader.get_mut().close();

    // Redirects carry a path on the same server.
    if status.is_redirect() {
        meta = format!("spartan://{}{meta}", url.authority());
    }

    Ok(Response {
        protocol: Protocol::Spartan,
        url: url.clone(),
        code,
        status,
        meta,
        body,
        partial,
    })
}
