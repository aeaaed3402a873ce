//! Tests for the networking module.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use smolnav_types::error::NavError;

use super::*;

// ---------------------------------------------------------------------------
// Connection lifetime
// ---------------------------------------------------------------------------

/// In-memory stream that counts how often it was closed.
struct CountingStream {
    data: io::Cursor<Vec<u8>>,
    written: Vec<u8>,
    closes: Arc<AtomicUsize>,
}

impl Read for CountingStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl Write for CountingStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl NetworkStream for CountingStream {
    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn counting_connection(data: &[u8]) -> (Connection, Arc<AtomicUsize>) {
    let closes = Arc::new(AtomicUsize::new(0));
    let stream = CountingStream {
        data: io::Cursor::new(data.to_vec()),
        written: Vec::new(),
        closes: Arc::clone(&closes),
    };
    (Connection::new(Box::new(stream), "test:0"), closes)
}

#[test]
fn connection_closes_once_on_drop() {
    let (conn, closes) = counting_connection(b"");
    drop(conn);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn explicit_close_then_drop_closes_once() {
    let (mut conn, closes) = counting_connection(b"");
    conn.close();
    conn.close();
    assert!(conn.is_closed());
    drop(conn);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn closed_connection_reads_eof_and_refuses_writes() {
    let (mut conn, _) = counting_connection(b"payload");
    conn.close();
    let mut buf = [0u8; 8];
    assert_eq!(conn.read(&mut buf).unwrap(), 0);
    let err = conn.write(b"x").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotConnected);
}

#[test]
fn connection_reads_through_to_stream() {
    let (mut conn, _) = counting_connection(b"20 text/gemini\r\n");
    let mut out = String::new();
    conn.read_to_string(&mut out).unwrap();
    assert_eq!(out, "20 text/gemini\r\n");
    assert_eq!(conn.peer(), "test:0");
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

#[test]
fn connect_plain_tcp_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = std::thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let mut line = String::new();
        BufReader::new(conn.try_clone().unwrap())
            .read_line(&mut line)
            .unwrap();
        conn.write_all(format!("echo {line}").as_bytes()).unwrap();
    });

    let connector = Connector::default();
    let mut conn = connector.connect("127.0.0.1", port).unwrap();
    conn.write_all(b"hello\n").unwrap();
    let mut reply = String::new();
    conn.read_to_string(&mut reply).unwrap();
    assert_eq!(reply, "echo hello\n");
    conn.close();
    handle.join().unwrap();
}

#[test]
fn connect_refused_is_connection_error() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let tmp = TcpListener::bind("127.0.0.1:0").unwrap();
        tmp.local_addr().unwrap().port()
    };
    let err = Connector::default().connect("127.0.0.1", port).unwrap_err();
    assert!(matches!(err, NavError::Connection(_)));
}

#[test]
fn connect_tls_without_provider_fails() {
    let err = Connector::default()
        .connect_tls("127.0.0.1", 1965)
        .unwrap_err();
    match err {
        NavError::Connection(msg) => assert!(msg.contains("TLS is not available")),
        other => panic!("expected connection error, got {other:?}"),
    }
}

#[test]
fn default_timeouts() {
    let t = Timeouts::default();
    assert_eq!(t.connect.as_secs(), 10);
    assert_eq!(t.read.as_secs(), 15);
}

// ---------------------------------------------------------------------------
// rustls against a self-signed server
// ---------------------------------------------------------------------------

#[cfg(feature = "tls-rustls")]
mod rustls_tests {
    use super::*;
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};

    fn self_signed_server(reply: &'static [u8]) -> (std::thread::JoinHandle<String>, u16) {
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
        let config = rustls::ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let (tcp, _) = listener.accept().unwrap();
            let conn = rustls::ServerConnection::new(Arc::new(config)).unwrap();
            let mut tls = rustls::StreamOwned::new(conn, tcp);
            let mut request = Vec::new();
            let mut byte = [0u8; 1];
            while tls.read(&mut byte).unwrap() == 1 {
                request.push(byte[0]);
                if byte[0] == b'\n' {
                    break;
                }
            }
            tls.write_all(reply).unwrap();
            tls.conn.send_close_notify();
            let _ = tls.flush();
            String::from_utf8(request).unwrap()
        });
        (handle, port)
    }

    #[test]
    fn permissive_provider_accepts_self_signed_certificate() {
        let (handle, port) = self_signed_server(b"20 text/gemini\r\nhi");
        let provider = RustlsTlsProvider::permissive().unwrap();
        let connector = Connector::default().with_tls(Arc::new(provider));

        let mut conn = connector.connect_tls("localhost", port).unwrap();
        conn.write_all(b"gemini://localhost/\r\n").unwrap();
        let mut reply = Vec::new();
        let _ = conn.read_to_end(&mut reply);
        assert_eq!(reply, b"20 text/gemini\r\nhi");
        conn.close();

        assert_eq!(handle.join().unwrap(), "gemini://localhost/\r\n");
    }

    #[test]
    fn verifying_provider_rejects_self_signed_certificate() {
        let (_handle, port) = self_signed_server(b"");
        let provider = RustlsTlsProvider::new().unwrap();
        let connector = Connector::default().with_tls(Arc::new(provider));

        let err = connector.connect_tls("localhost", port).unwrap_err();
        assert!(matches!(err, NavError::Connection(_)));
    }
}
