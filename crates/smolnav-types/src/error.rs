//! Error types for smolnav.

use std::io;

/// Errors produced while resolving, fetching, or rendering a resource.
///
/// Every variant is recoverable at the navigation boundary: a failed
/// navigation is reported and the client moves on to the next action.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Host unreachable, DNS failure, TLS handshake failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Malformed, empty, or truncated response header; bad status code.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The response meta could not be parsed as a media type.
    #[error("invalid media type {meta:?}: {reason}")]
    MediaType { meta: String, reason: String },

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// The redirect ceiling was hit. `chain` holds the retained window of
    /// redirect targets, oldest first.
    #[error("too many redirects ({count}): {}", .chain.join(" -> "))]
    RedirectLoop { count: usize, chain: Vec<String> },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A link, history or tour index that names no entry.
    #[error("no entry {index} (have {len})")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, NavError>;
