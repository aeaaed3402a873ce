//! Opening TCP and TLS connections.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use smolnav_types::error::{NavError, Result};

use crate::stream::{Connection, NetworkStream, StdNetworkStream};
use crate::tls::TlsProvider;

/// Connect and read timeouts applied to every socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(15),
        }
    }
}

/// Opens connections on behalf of protocol transactions.
#[derive(Clone)]
pub struct Connector {
    timeouts: Timeouts,
    tls: Option<Arc<dyn TlsProvider>>,
}

impl Connector {
    /// A connector without TLS support. TLS connections will fail with a
    /// [`NavError::Connection`].
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            tls: None,
        }
    }

    pub fn with_tls(mut self, provider: Arc<dyn TlsProvider>) -> Self {
        self.tls = Some(provider);
        self
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Open a plain TCP connection.
    pub fn connect(&self, host: &str, port: u16) -> Result<Connection> {
        let stream = self.tcp_connect(host, port)?;
        log::debug!("connected to {host}:{port}");
        Ok(Connection::new(
            Box::new(StdNetworkStream::new(stream)),
            format!("{host}:{port}"),
        ))
    }

    /// Open a TCP connection and complete a TLS handshake over it.
    pub fn connect_tls(&self, host: &str, port: u16) -> Result<Connection> {
        let provider = self
            .tls
            .as_ref()
            .ok_or_else(|| NavError::Connection("TLS is not available".to_string()))?;

        let stream = self.tcp_connect(host, port)?;
        let net_stream: Box<dyn NetworkStream> = Box::new(StdNetworkStream::new(stream));
        let tls_stream = provider.connect_tls(net_stream, host)?;
        log::debug!("TLS session established with {host}:{port}");
        Ok(Connection::new(tls_stream, format!("{host}:{port}")))
    }

    /// Resolve `host:port` and connect to the first address that answers.
    fn tcp_connect(&self, host: &str, port: u16) -> Result<TcpStream> {
        // Bracketed IPv6 literals come straight from the URL authority.
        let bare_host = host.trim_start_matches('[').trim_end_matches(']');
        let addrs = (bare_host, port)
            .to_socket_addrs()
            .map_err(|e| NavError::Connection(format!("DNS resolution failed for {host}: {e}")))?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeouts.connect) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeouts.read)).map_err(|e| {
                        NavError::Connection(format!("set read timeout: {e}"))
                    })?;
                    stream.set_write_timeout(Some(self.timeouts.read)).map_err(|e| {
                        NavError::Connection(format!("set write timeout: {e}"))
                    })?;
                    return Ok(stream);
                },
                Err(e) => last_err = Some(e),
            }
        }

        Err(match last_err {
            Some(e) => NavError::Connection(format!("TCP connect to {host}:{port} failed: {e}")),
            None => NavError::Connection(format!("no addresses for {host}:{port}")),
        })
    }
}

impl Default for Connector {
    fn default() -> Self {
        Self::new(Timeouts::default())
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("timeouts", &self.timeouts)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}
