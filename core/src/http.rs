//! HTTP exchange types shared by the invoker and the transport.
//!
//! # Design
//! Requests and responses are plain data. The invoker builds an
//! `HttpRequest`, a `Transport` executes it, and the classifier consumes the
//! resulting `HttpResponse`. Keeping the exchange as data lets the login
//! handshake and every invoker be tested against a scripted transport without
//! touching the network.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: the API root joined with the operation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name).first().copied()
    }
}

/// An HTTP response described as plain data.
///
/// Multi-valued headers (e.g. `Set-Cookie`) appear once per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// All values of the named header, compared case-insensitively.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        find_header(&self.headers, name)
    }
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    headers
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case_and_keeps_every_value() {
        let response = HttpResponse {
            status: 200,
            headers: vec![
                ("set-cookie".to_string(), "A=1".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Set-Cookie".to_string(), "B=2".to_string()),
            ],
            body: String::new(),
        };
        assert_eq!(response.header_values("SET-COOKIE"), vec!["A=1", "B=2"]);
        assert!(response.header_values("x-missing").is_empty());
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
