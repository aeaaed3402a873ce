//! Client configuration, loaded from TOML.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use smolnav_net::Timeouts;
use smolnav_types::error::{NavError, Result};

/// Client settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Upper bound on the text column width.
    pub max_width: usize,
    /// Left margin as a fraction of the terminal width, in `[0, 0.5)`.
    pub left_margin: f64,
    /// Redirects followed before asking the user. Negative follows without
    /// asking, zero asks every time.
    pub max_redirects: i32,
    /// Show the redirect chain in redirect prompts.
    pub show_redirect_chain: bool,
    /// Page opened at startup when no URL is given.
    pub start_url: String,
    /// Endpoint queried by the search command.
    pub search_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Response bodies are truncated at this size.
    pub max_body_bytes: usize,
    /// Emit ANSI styling.
    pub color: bool,
    /// Verify server certificates against the web PKI roots.
    pub tls_verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_width: 100,
            left_margin: 0.15,
            max_redirects: 10,
            show_redirect_chain: true,
            start_url: String::new(),
            search_url: "gemini://geminispace.info/search".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 15,
            max_body_bytes: 8 * 1024 * 1024,
            color: true,
            tls_verify: false,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(s) => {
                log::debug!("loading config from {}", path.display());
                Self::from_toml_str(&s)
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            },
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..0.5).contains(&self.left_margin) {
            return Err(NavError::Config(format!(
                "left_margin must be in [0, 0.5), got {}",
                self.left_margin
            )));
        }
        if self.max_width == 0 {
            return Err(NavError::Config("max_width must be positive".to_string()));
        }
        if self.max_body_bytes == 0 {
            return Err(NavError::Config(
                "max_body_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            read: Duration::from_secs(self.read_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.max_width, 100);
        assert!((cfg.left_margin - 0.15).abs() < f64::EPSILON);
        assert_eq!(cfg.max_redirects, 10);
        assert!(cfg.show_redirect_chain);
        assert!(cfg.start_url.is_empty());
        assert_eq!(cfg.search_url, "gemini://geminispace.info/search");
        assert_eq!(cfg.max_body_bytes, 8 * 1024 * 1024);
        assert!(cfg.color);
        assert!(!cfg.tls_verify);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = ClientConfig::from_toml_str("max_width = 72\nmax_redirects = -1\n").unwrap();
        assert_eq!(cfg.max_width, 72);
        assert_eq!(cfg.max_redirects, -1);
        assert_eq!(cfg.read_timeout_secs, 15);
    }

    #[test]
    fn timeouts_from_seconds() {
        let cfg = ClientConfig::from_toml_str("connect_timeout_secs = 3\nread_timeout_secs = 7")
            .unwrap();
        let t = cfg.timeouts();
        assert_eq!(t.connect, Duration::from_secs(3));
        assert_eq!(t.read, Duration::from_secs(7));
    }

    #[test]
    fn invalid_margin_rejected() {
        for bad in ["left_margin = -0.1", "left_margin = 0.5", "left_margin = 0.9"] {
            let err = ClientConfig::from_toml_str(bad).unwrap_err();
            assert!(matches!(err, NavError::Config(_)), "{bad}");
        }
    }

    #[test]
    fn zero_width_rejected() {
        let err = ClientConfig::from_toml_str("max_width = 0").unwrap_err();
        assert!(matches!(err, NavError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = ClientConfig::from_toml_str("max_width = \"wide\"").unwrap_err();
        assert!(matches!(err, NavError::TomlParse(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("smolnav-config-does-not-exist.toml");
        let cfg = ClientConfig::load(&path).unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }
}
