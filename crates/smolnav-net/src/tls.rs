//! TLS provider abstraction.
//!
//! The [`Connector`](crate::Connector) wraps a plain TCP
//! [`NetworkStream`] in a TLS session through this trait, so the protocol
//! code never depends on a concrete TLS library.

use smolnav_types::error::Result;

use crate::stream::NetworkStream;

/// Provides TLS client connections.
pub trait TlsProvider: Send + Sync {
    /// Wrap `stream` in a TLS client session, performing the handshake.
    ///
    /// `server_name` is used for SNI and, when the provider verifies
    /// certificates, for hostname checks.
    fn connect_tls(
        &self,
        stream: Box<dyn NetworkStream>,
        server_name: &str,
    ) -> Result<Box<dyn NetworkStream>>;
}
