//! Networking: plain TCP and TLS byte streams for the smolnav transaction
//! layer.
//!
//! The [`Connector`] opens a [`Connection`] to `host:port`, optionally
//! wrapped by a [`TlsProvider`]. A [`Connection`] closes its underlying
//! stream exactly once, either explicitly or when dropped.

mod connector;
mod stream;
pub mod tls;
#[cfg(feature = "tls-rustls")]
pub mod tls_rustls;

pub use connector::{Connector, Timeouts};
pub use stream::{Connection, NetworkStream, StdNetworkStream};
pub use tls::TlsProvider;
#[cfg(feature = "tls-rustls")]
pub use tls_rustls::RustlsTlsProvider;

#[cfg(test)]
mod tests;
