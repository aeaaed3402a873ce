//! Nex: plain TCP, `<path>\n` request, no response header.

use std::io::Write;

use smolnav_net::Connector;
use smolnav_types::Url;
use smolnav_types::error::{NavError, Result};

use super::{Protocol, Response, read_body};
use crate::media;

pub const DEFAULT_PORT: u16 = 1900;

/// Guess the media type of a Nex resource from its path.
pub fn media_type_for_path(path: &str) -> &'static str {
    if path.is_empty() || path.ends_with('/') {
        return media::NEX_DIRECTORY;
    }
    let name = path.rsplit('/').next().unwrap_or(path);
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "gmi" | "gemini" => media::GEMTEXT,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "text/plain",
    }
}

pub(crate) fn fetch(url: &Url, connector: &Connector, max_body: usize) -> Result<Response> {
    let path = if url.path.is_empty() { "/" } else { &url.path };
    let mut conn = connector.connect(&url.host, url.port_or(DEFAULT_PORT))?;
    conn.write_all(format!("{path}\n").as_bytes())
        .and_then(|()| conn.flush())
        .map_err(|e| NavError::Connection(format!("sending request to {}: {e}", conn.peer())))?;

    let body = read_body(&mut conn, max_body);
    conn.close();

    Ok(Response::success(
        Protocol::Nex,
        url,
        media_type_for_path(path),
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestServer;

    #[test]
    fn directories_and_extensions() {
        assert_eq!(media_type_for_path(""), media::NEX_DIRECTORY);
        assert_eq!(media_type_for_path("/"), media::NEX_DIRECTORY);
        assert_eq!(media_type_for_path("/logs/"), media::NEX_DIRECTORY);
        assert_eq!(media_type_for_path("/post.gmi"), media::GEMTEXT);
        assert_eq!(media_type_for_path("/cat.JPG"), "image/jpeg");
        assert_eq!(media_type_for_path("/notes.txt"), "text/plain");
        assert_eq!(media_type_for_path("/README"), "text/plain");
        assert_eq!(media_type_for_path("/v1.2/README"), "text/plain");
    }

    #[test]
    fn fetch_directory() {
        let server = TestServer::start(vec![b"=> a.txt\n=> sub/\n".to_vec()]);
        let url = Url::parse(&server.url("nex", "")).unwrap();
        let resp = fetch(&url, &Connector::default(), 1024).unwrap();
        assert_eq!(resp.meta, media::NEX_DIRECTORY);
        assert_eq!(resp.body, b"=> a.txt\n=> sub/\n");
        assert!(resp.status.is_success());
        assert_eq!(server.join()[0], b"/\n");
    }
}
