//! Shared test utilities for the browser crate.
//!
//! Provides a loopback [`TestServer`] that answers a scripted sequence of
//! connections, a [`PassthroughTlsProvider`] so Gemini can be exercised
//! over plain TCP, and a [`ScriptedPrompter`] that records every prompt.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use smolnav_net::{Connector, NetworkStream, TlsProvider};
use smolnav_types::error::Result;

use crate::session::Prompter;

/// A TLS provider that passes the stream through unchanged.
pub struct PassthroughTlsProvider;

impl TlsProvider for PassthroughTlsProvider {
    fn connect_tls(
        &self,
        stream: Box<dyn NetworkStream>,
        _server_name: &str,
    ) -> Result<Box<dyn NetworkStream>> {
        Ok(stream)
    }
}

/// A connector whose "TLS" is plain TCP.
pub fn gemini_connector() -> Connector {
    Connector::default().with_tls(Arc::new(PassthroughTlsProvider))
}

/// A local server that accepts a fixed number of connections, records each
/// request and answers with a scripted response.
pub struct TestServer {
    pub port: u16,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Answer one connection per entry of `responses`, in order.
    pub fn start(responses: Vec<Vec<u8>>) -> Self {
        let count = responses.len();
        Self::start_with(count, move |_, i, _| responses[i].clone())
    }

    /// Answer `count` connections with `respond(port, index, request)`.
    pub fn start_with<F>(count: usize, respond: F) -> Self
    where
        F: Fn(u16, usize, &[u8]) -> Vec<u8> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        let handle = std::thread::spawn(move || {
            for i in 0..count {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
                let request = read_request(&mut stream);
                let response = respond(port, i, &request);
                log.lock().unwrap().push(request);
                let _ = stream.write_all(&response);
                let _ = stream.flush();
            }
        });

        Self {
            port,
            requests,
            handle: Some(handle),
        }
    }

    /// `scheme://localhost:<port><path>`.
    pub fn url(&self, scheme: &str, path: &str) -> String {
        format!("{scheme}://localhost:{}{path}", self.port)
    }

    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Wait until every scripted connection was served.
    pub fn join(mut self) -> Vec<Vec<u8>> {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
        self.requests()
    }
}

/// Read one request: a line, plus the upload announced by a Spartan
/// request line (`host path len`).
fn read_request<R: Read>(stream: R) -> Vec<u8> {
    let mut reader = BufReader::new(stream);
    let mut request = Vec::new();
    let _ = reader.read_until(b'\n', &mut request);

    let line = String::from_utf8_lossy(&request).trim_end().to_string();
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() == 3
        && let Ok(len) = parts[2].parse::<usize>()
    {
        let mut upload = vec![0u8; len];
        if reader.read_exact(&mut upload).is_ok() {
            request.extend_from_slice(&upload);
        }
    }
    request
}

/// One recorded prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Redirect { target: String, chain: Vec<String> },
    Input { prompt: String, sensitive: bool },
}

/// A prompter that replays scripted answers and records every prompt.
///
/// Redirect confirmations default to `true` and input to `None` once the
/// scripts run out.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub confirms: VecDeque<bool>,
    pub inputs: VecDeque<Option<String>>,
    pub prompts: Vec<Prompt>,
}

impl ScriptedPrompter {
    pub fn redirect_prompts(&self) -> usize {
        self.prompts
            .iter()
            .filter(|p| matches!(p, Prompt::Redirect { .. }))
            .count()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm_redirect(&mut self, target: &str, chain: &[String]) -> bool {
        self.prompts.push(Prompt::Redirect {
            target: target.to_string(),
            chain: chain.to_vec(),
        });
        self.confirms.pop_front().unwrap_or(true)
    }

    fn read_input(&mut self, prompt: &str, sensitive: bool) -> Option<String> {
        self.prompts.push(Prompt::Input {
            prompt: prompt.to_string(),
            sensitive,
        });
        self.inputs.pop_front().flatten()
    }
}
