//! Gemini: TLS, `<url>\r\n` request, `<2 digits> <meta>\r\n` header.

use std::io::{BufReader, Write};

use smolnav_net::Connector;
use smolnav_types::Url;
use smolnav_types::error::{NavError, Result};

use super::{Protocol, Response, Status, read_body, read_header_line};

pub const DEFAULT_PORT: u16 = 1965;

/// Longest request URL the protocol allows, in bytes.
const MAX_REQUEST_URL: usize = 1024;

/// Status codes the Gemini protocol defines.
const KNOWN_CODES: &[u8] = &[
    10, 11, 20, 30, 31, 40, 41, 42, 43, 44, 50, 51, 52, 53, 59, 60, 61, 62,
];

impl Status {
    /// Classify a Gemini status code by its tens digit.
    pub fn from_gemini(code: u8) -> Option<Self> {
        match code {
            10..=19 => Some(Status::Input {
                sensitive: code == 11,
            }),
            20..=29 => Some(Status::Success),
            30..=39 => Some(Status::Redirect {
                permanent: code == 31,
            }),
            40..=49 => Some(Status::TemporaryFailure),
            50..=59 => Some(Status::PermanentFailure),
            60..=69 => Some(Status::ClientCertificateRequired),
            _ => None,
        }
    }
}

/// The request line for `url`: the absolute URL without fragment, CRLF.
pub fn build_request(url: &Url) -> Result<Vec<u8>> {
    let mut url = url.clone();
    url.fragment = None;
    let url = url.to_string();
    if url.len() > MAX_REQUEST_URL {
        return Err(NavError::InvalidUrl(format!(
            "request URL is {} bytes, the limit is {MAX_REQUEST_URL}",
            url.len()
        )));
    }
    Ok(format!("{url}\r\n").into_bytes())
}

/// Parse a header line (terminator already removed) into code, status
/// and meta.
pub fn parse_header(line: &str) -> Result<(u8, Status, String)> {
    let bytes = line.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
        return Err(NavError::Protocol(format!("non-numeric status in {line:?}")));
    }
    let rest = &line[2..];
    if let Some(c) = rest.chars().next()
        && !c.is_whitespace()
    {
        return Err(NavError::Protocol(format!("malformed header {line:?}")));
    }

    let code = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let status = Status::from_gemini(code)
        .ok_or_else(|| NavError::Protocol(format!("unknown status code {code}")))?;
    if !KNOWN_CODES.contains(&code) {
        log::warn!("non-standard Gemini status {code}, treating as {status:?}");
    }

    Ok((code, status, rest.trim().to_string()))
}

pub(crate) fn fetch(url: &Url, connector: &Connector, max_body: usize) -> Result<Response> {
    let request = build_request(url)?;
    let mut conn = connector.connect_tls(&url.host, url.port_or(DEFAULT_PORT))?;
    conn.write_all(&request)
        .and_then(|()| conn.flush())
        .map_err(|e| NavError::Connection(format!("sending request to {}: {e}", conn.peer())))?;

    let mut reader = BufReader::new(conn);
    let header = read_header_line(&mut reader)?;
    let (code, status, meta) = parse_header(&header)?;

    let (body, partial) = if status.is_success() {
        read_body(&mut reader, max_body)
    } else {
        (Vec::new(), false)
    };
    reader.get_mut().close();

    Ok(Response {
        protocol: Protocol::Gemini,
        url: url.clone(),
        code,
        status,
        meta,
        body,
        partial,
    })
}
