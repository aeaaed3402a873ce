//! Markup rendering: response bodies to terminal-ready text.
//!
//! [`render`] dispatches on the page's media type and returns the text
//! together with a freshly numbered [`LinkTable`]. Rendering does no I/O
//! and never touches session state; the caller decides whether to install
//! the result.

pub mod gemtext;
pub mod gophermap;
pub mod line;
pub mod nexdir;
pub mod style;
pub mod wrap;

use smolnav_types::Url;
use smolnav_types::error::{NavError, Result};

use crate::config::ClientConfig;
use crate::media::{self, MediaType};
use crate::nav::LinkTable;
use crate::protocol::Response;

/// A fetched resource, ready to render.
#[derive(Debug, Clone)]
pub struct Page {
    /// Base URL for resolving relative links.
    pub url: Url,
    pub media: MediaType,
    pub body: Vec<u8>,
    /// The body is incomplete.
    pub partial: bool,
}

impl Page {
    pub fn new(url: Url, media: MediaType, body: Vec<u8>) -> Self {
        Self {
            url,
            media,
            body,
            partial: false,
        }
    }

    /// Build a page from a success response, parsing its meta.
    pub fn from_response(response: Response) -> Result<Self> {
        Ok(Self {
            media: media::parse_meta(&response.meta)?,
            url: response.url,
            body: response.body,
            partial: response.partial,
        })
    }

    /// Body as text. Invalid UTF-8 is replaced.
    pub fn text(&self) -> String {
        if let Some(charset) = self.media.param("charset")
            && !charset.eq_ignore_ascii_case("utf-8")
            && !charset.eq_ignore_ascii_case("us-ascii")
        {
            log::debug!("decoding {charset} body of {} as UTF-8", self.url);
        }
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Layout parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub term_width: usize,
    pub max_width: usize,
    pub left_margin: f64,
    pub color: bool,
}

impl RenderOptions {
    pub fn from_config(config: &ClientConfig, term_width: usize) -> Self {
        Self {
            term_width,
            max_width: config.max_width,
            left_margin: config.left_margin,
            color: config.color,
        }
    }

    /// Left margin in columns.
    pub fn margin(&self) -> usize {
        (self.term_width as f64 * self.left_margin).floor() as usize
    }

    /// Width available to text, excluding the margins.
    pub fn text_width(&self) -> usize {
        self.term_width
            .saturating_sub(2 * self.margin())
            .min(self.max_width)
            .max(1)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default(), 80)
    }
}

/// A rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: Url,
    pub text: String,
    pub links: LinkTable,
    /// Rendered from an incomplete body.
    pub partial: bool,
}

/// Render `page` according to its media type.
pub fn render(page: &Page, opts: &RenderOptions) -> Result<RenderedPage> {
    let mut links = LinkTable::new();
    let essence = page.media.essence();

    let text = if essence == media::OCTET_STREAM {
        page.text()
    } else if essence == media::GOPHER_MENU {
        gophermap::render(&page.text(), opts, &mut links)
    } else if essence == media::NEX_DIRECTORY {
        nexdir::render(&page.text(), &page.url, opts, &mut links)
    } else if !page.media.is_text() {
        return Err(NavError::UnsupportedMedia(essence.to_string()));
    } else if essence == media::GEMTEXT {
        gemtext::render(&page.text(), &page.url, opts, &mut links)
    } else {
        page.text()
    };

    if page.partial {
        log::warn!("{} rendered from a partial body", page.url);
    }

    Ok(RenderedPage {
        url: page.url.clone(),
        text,
        links,
        partial: page.partial,
    })
}
