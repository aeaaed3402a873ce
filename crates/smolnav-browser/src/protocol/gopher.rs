//! Gopher: plain TCP, `<selector>\n` request, no response header.
//!
//! URLs follow RFC 4266: the path is `/<type><selector>`, and the query,
//! when present, is a search string sent as `<selector>\t<query>`.

use std::io::Write;

use smolnav_net::Connector;
use smolnav_types::Url;
use smolnav_types::error::{NavError, Result};
use smolnav_types::url::percent_decode;

use super::{Protocol, Response, read_body};
use crate::media;

pub const DEFAULT_PORT: u16 = 70;

/// Split a URL path into item type and selector. An empty path is the
/// root menu.
pub fn split_path(path: &str) -> (char, &str) {
    let rest = path.strip_prefix('/').unwrap_or(path);
    let mut chars = rest.chars();
    match chars.next() {
        Some(kind) => (kind, chars.as_str()),
        None => ('1', ""),
    }
}

/// Media type served by an item type.
pub fn media_type_for_item(kind: char) -> &'static str {
    match kind {
        '0' => "text/plain",
        '1' | '7' => media::GOPHER_MENU,
        'h' => "text/html",
        'g' => "image/gif",
        'I' => "image/*",
        'p' => "image/png",
        'G' => media::GEMTEXT,
        '4' | '5' | '6' | '9' | 's' => media::OCTET_STREAM,
        _ => "text/plain",
    }
}

/// Short tag shown next to menu entries of each item type.
pub fn item_tag(kind: char) -> Option<&'static str> {
    Some(match kind {
        '0' => "TXT",
        '1' => "DIR",
        '3' => "ERR",
        '4' | '9' => "BIN",
        '5' => "DOS",
        '6' => "UUE",
        '7' => "SEARCH",
        '8' | 'T' => "TEL",
        'g' => "GIF",
        'G' => "GMI",
        'h' => "HTML",
        'I' => "IMG",
        'p' => "PNG",
        's' => "SND",
        'S' => "SSH",
        _ => return None,
    })
}

/// The request line for `url`.
pub fn build_request(url: &Url) -> Result<Vec<u8>> {
    let (_, selector) = split_path(&url.path);
    let selector = percent_decode(selector)?;
    let line = match &url.query {
        Some(q) => format!("{selector}\t{}\n", percent_decode(q)?),
        None => format!("{selector}\n"),
    };
    Ok(line.into_bytes())
}

pub(crate) fn fetch(url: &Url, connector: &Connector, max_body: usize) -> Result<Response> {
    let (kind, _) = split_path(&url.path);
    let request = build_request(url)?;
    let mut conn = connector.connect(&url.host, url.port_or(DEFAULT_PORT))?;
    conn.write_all(&request)
        .and_then(|()| conn.flush())
        .map_err(|e| NavError::Connection(format!("sending request to {}: {e}", conn.peer())))?;

    let body = read_body(&mut conn, max_body);
    conn.close();

    Ok(Response::success(
        Protocol::Gopher,
        url,
        media_type_for_item(kind),
        body,
    ))
}
