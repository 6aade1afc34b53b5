//! Transport seam between the invoker and the network.
//!
//! # Design
//! A `Transport` executes one `HttpRequest` and hands back whatever the
//! server answered, whatever the status. Deciding what counts as an error is
//! left to `classify`; the transport only fails when no response exists at
//! all (DNS, connect, timeout, IO).
//!
//! `UreqTransport` is the blocking default. Tests substitute a scripted
//! implementation.

use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::config::ClientConfig;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes HTTP exchanges for a session.
///
/// Implementations must be shareable across threads: every invoker derived
/// from a context holds a handle to the same transport.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Broad category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Host lookup or TCP/TLS connect failed.
    Connect,
    /// The exchange did not finish in time.
    Timeout,
    /// Reading or writing the stream failed.
    Io,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Io => "io",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A failure that left the exchange without a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        let kind = match &err {
            ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                TransportErrorKind::Connect
            }
            ureq::Error::Io(_) => TransportErrorKind::Io,
            _ => TransportErrorKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent is built with `http_status_as_error(false)` so 4xx/5xx
/// responses come back as data.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(config.timeout_connect)
            .timeout_global(config.timeout_global)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => self.with_headers(self.agent.get(url), request).call(),
            HttpMethod::Delete => self.with_headers(self.agent.delete(url), request).call(),
            HttpMethod::Post => send(self.with_headers(self.agent.post(url), request), body),
            HttpMethod::Put => send(self.with_headers(self.agent.put(url), request), body),
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // Undecodable bytes still belong to a response that arrived; `classify`
        // decides what they mean.
        let bytes = response.body_mut().read_to_vec()?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        trace!(method = %request.method, url = %request.url, status, "exchange complete");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl UreqTransport {
    fn with_headers<B>(
        &self,
        mut builder: ureq::RequestBuilder<B>,
        request: &HttpRequest,
    ) -> ureq::RequestBuilder<B> {
        builder = builder.header("user-agent", self.user_agent.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::definition::MY_WORKSPACE;
    use crate::error::BeehiveError;

    #[test]
    fn transport_error_display() {
        let err = TransportError::new(TransportErrorKind::Timeout, "read timed out");
        assert_eq!(err.to_string(), "timeout error: read timed out");
        assert_eq!(err.kind(), TransportErrorKind::Timeout);
        assert_eq!(err.message(), "read timed out");
    }

    /// Answers the first connection with `reply` verbatim.
    fn serve_once(reply: &'static [u8]) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(reply).unwrap();
        });
        format!("http://{addr}/comb/v1/d/my/workspace")
    }

    fn get(url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn non_utf8_success_body_is_illegal_state() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 3\r\nConnection: close\r\n\r\n\xFF\xFE{",
        );
        let outcome = UreqTransport::default().execute(&get(url));
        assert_eq!(outcome.as_ref().map(|r| r.status).ok(), Some(200));

        let err = classify(&MY_WORKSPACE, outcome).unwrap_err();
        assert!(matches!(err, BeehiveError::IllegalState { .. }), "{err:?}");
    }

    #[test]
    fn non_utf8_error_body_keeps_status() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 2\r\nConnection: close\r\n\r\n\xC3\x28",
        );
        let outcome = UreqTransport::default().execute(&get(url));

        let err = classify(&MY_WORKSPACE, outcome).unwrap_err();
        let fault = err.as_api_fault().expect("expected an API fault");
        assert_eq!(fault.status(), Some(404));
        assert!(fault.transport_error().is_none());
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Nothing listens on the discard port.
        let transport = UreqTransport::new(
            &ClientConfig::default().with_connect_timeout(std::time::Duration::from_secs(2)),
        );
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/comb/v1/d/my/workspace".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(&request).unwrap_err();
        assert_ne!(err.kind(), TransportErrorKind::Other, "{err}");
    }
}
