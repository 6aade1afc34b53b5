//! Session identity obtained at login.
//!
//! A `Credential` pairs the server's session cookie with the anti-CSRF token
//! from the login body. Only the login handshake in `context` creates one, and
//! it is never mutated afterwards.

use std::fmt;

use crate::error::{BeehiveError, Result};

/// Name of the session cookie issued by the login call.
pub const SESSION_COOKIE_NAME: &str = "JSESSIONID";

/// Header carrying the token on authenticated calls.
pub const TOKEN_HEADER: &str = "X-Beehive-Anticsrf-Token";

/// The session cookie, scoped to the host that issued it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
    value: String,
    domain: String,
}

impl SessionCookie {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Host the cookie was issued for.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `NAME=VALUE`, as sent in a `Cookie` header.
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Finds the cookie called `name` among raw `Set-Cookie` values.
    ///
    /// Returns `Ok(None)` when no value starts with `name=`. A matching value
    /// whose first attribute is not a single `name=value` pair is an
    /// `IllegalState`.
    pub(crate) fn find(set_cookie: &[&str], name: &str, domain: &str) -> Result<Option<Self>> {
        let prefix = format!("{name}=");
        let Some(raw) = set_cookie.iter().find(|v| v.trim_start().starts_with(&prefix)) else {
            return Ok(None);
        };

        let pair = raw.split(';').next().unwrap_or_default();
        match pair.split_once('=') {
            Some((key, value)) if !value.trim().is_empty() && !value.contains('=') => {
                Ok(Some(Self {
                    name: key.trim().to_string(),
                    value: value.trim().to_string(),
                    domain: domain.to_string(),
                }))
            }
            _ => Err(BeehiveError::illegal_state(format!(
                "invalid {name} cookie is going to be set"
            ))),
        }
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Authenticated session identity: session cookie plus token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    cookie: SessionCookie,
    token: String,
}

impl Credential {
    pub(crate) fn new(cookie: SessionCookie, token: String) -> Self {
        Self { cookie, token }
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Headers that authenticate a call with this credential.
    pub(crate) fn auth_headers(&self) -> [(String, String); 2] {
        [
            ("Cookie".to_string(), self.cookie.header_value()),
            (TOKEN_HEADER.to_string(), self.token.clone()),
        ]
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("cookie", &self.cookie)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_credential(value: &str, token: &str) -> Credential {
    Credential::new(
        SessionCookie {
            name: SESSION_COOKIE_NAME.to_string(),
            value: value.to_string(),
            domain: "beehive.example.com".to_string(),
        },
        token.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_named_cookie_among_several() {
        let headers = ["ORA_UCM=abc; Path=/", "JSESSIONID=XYZ; Path=/; HttpOnly"];
        let cookie = SessionCookie::find(&headers, "JSESSIONID", "beehive.example.com")
            .unwrap()
            .unwrap();
        assert_eq!(cookie.name(), "JSESSIONID");
        assert_eq!(cookie.value(), "XYZ");
        assert_eq!(cookie.domain(), "beehive.example.com");
        assert_eq!(cookie.header_value(), "JSESSIONID=XYZ");
    }

    #[test]
    fn absent_cookie_is_none() {
        let headers = ["OTHER=1"];
        let found = SessionCookie::find(&headers, "JSESSIONID", "host").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn prefix_must_match_whole_name() {
        let headers = ["JSESSIONID_OLD=1"];
        assert!(SessionCookie::find(&headers, "JSESSIONID", "host")
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_cookie_is_illegal_state() {
        for raw in ["JSESSIONID=; Path=/", "JSESSIONID=a=b"] {
            let err = SessionCookie::find(&[raw], "JSESSIONID", "host").unwrap_err();
            assert!(matches!(err, BeehiveError::IllegalState { .. }), "{raw}");
        }
    }

    #[test]
    fn debug_redacts_secrets() {
        let credential = test_credential("SECRET-COOKIE", "SECRET-TOKEN");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("SECRET-COOKIE"));
        assert!(!debug.contains("SECRET-TOKEN"));
        assert!(debug.contains("JSESSIONID"));
    }

    #[test]
    fn auth_headers_carry_cookie_and_token() {
        let credential = test_credential("XYZ", "T1");
        let headers = credential.auth_headers();
        assert_eq!(headers[0], ("Cookie".to_string(), "JSESSIONID=XYZ".to_string()));
        assert_eq!(headers[1], (TOKEN_HEADER.to_string(), "T1".to_string()));
    }
}
