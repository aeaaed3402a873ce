//! Foundation types for smolnav.
//!
//! This crate holds the pieces shared by every other smolnav crate: the
//! navigation error taxonomy and the URL type used to address Gemini,
//! Spartan, Nex and Gopher resources.

pub mod error;
pub mod url;

pub use error::{NavError, Result};
pub use url::Url;
