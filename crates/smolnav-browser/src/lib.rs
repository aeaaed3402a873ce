//! Small-internet browsing engine: Gemini, Spartan, Nex and Gopher.
//!
//! This crate ties together the protocol transactions, media-type
//! handling, gemtext/gophermap/Nex rendering and navigation state into a
//! [`Session`] -- the component a line-mode front end drives. The front
//! end supplies a [`Prompter`] for redirect confirmations and input, and
//! prints whatever [`Session::last_rendered`] holds.

pub mod config;
pub mod media;
pub mod nav;
pub mod protocol;
pub mod redirect;
pub mod render;
pub mod session;

#[cfg(test)]
pub(crate) mod test_utils;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use config::ClientConfig;
pub use media::MediaType;
pub use nav::{History, Link, LinkTable, TourList};
pub use protocol::{Protocol, Response, Status};
pub use redirect::{Decision, RedirectChain, RedirectController};
pub use render::{Page, RenderOptions, RenderedPage};
pub use session::{Outcome, Prompter, Session};
