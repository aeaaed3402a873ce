//! Byte streams and the single-close [`Connection`] wrapper.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

/// A bidirectional byte stream that can be shut down.
///
/// Implemented by plain TCP sockets and by TLS sessions layered on top of
/// them, so transaction code never needs to know which one it holds.
pub trait NetworkStream: Read + Write + Send {
    /// Shut the stream down. Called at most once by [`Connection`].
    fn close(&mut self) -> io::Result<()>;
}

/// [`NetworkStream`] over a blocking [`TcpStream`].
pub struct StdNetworkStream {
    inner: TcpStream,
}

impl StdNetworkStream {
    pub fn new(inner: TcpStream) -> Self {
        Self { inner }
    }
}

impl Read for StdNetworkStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for StdNetworkStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl NetworkStream for StdNetworkStream {
    fn close(&mut self) -> io::Result<()> {
        match self.inner.shutdown(Shutdown::Both) {
            // The peer may already have torn the socket down.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

/// An open connection to a server.
///
/// Owns the stream for the duration of one transaction. The stream is
/// closed exactly once: by [`Connection::close`] or, failing that, on drop.
/// Reads and writes after closing behave like a shut-down socket.
pub struct Connection {
    stream: Option<Box<dyn NetworkStream>>,
    peer: String,
}

impl Connection {
    pub fn new(stream: Box<dyn NetworkStream>, peer: impl Into<String>) -> Self {
        Self {
            stream: Some(stream),
            peer: peer.into(),
        }
    }

    /// `host:port` this connection was opened to.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Close the underlying stream. Later calls are no-ops.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            match stream.close() {
                Ok(()) => log::debug!("closed connection to {}", self.peer),
                Err(e) => log::debug!("closing connection to {}: {e}", self.peer),
            }
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.as_mut() {
            Some(stream) => stream.read(buf),
            None => Ok(0),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stream.as_mut() {
            Some(stream) => stream.write(buf),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("connection to {} is closed", self.peer),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream.as_mut() {
            Some(stream) => stream.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer)
            .field("closed", &self.is_closed())
            .finish()
    }
}
