//! Authenticated session with a Beehive server.
//!
//! # Design
//! `BeehiveContext` exists only after a successful login: the constructor
//! performs the `session/login` exchange and fails as a whole unless both the
//! `JSESSIONID` cookie and the token were extracted. The context then acts as
//! the sole factory for invokers, handing each one the same api root and
//! credential, so every call it produces is authenticated.
//!
//! ```ignore
//! use beehive_core::{definition, BeehiveContext};
//!
//! let context = BeehiveContext::open("https://beehive.example.com", "alice", "secret")?;
//! let response = context.get_invoker(definition::MY_WORKSPACE.kind)?.invoke()?;
//! assert_eq!(response.require_body()?.bee_type(), Some("personalWorkspace"));
//! ```

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::classify::classify;
use crate::config::ClientConfig;
use crate::credential::{Credential, SessionCookie, SESSION_COOKIE_NAME};
use crate::definition::{OperationKind, SESSION_LOGIN};
use crate::error::{BeehiveError, Result};
use crate::invoker::{build_request, CallState, Invoker, SessionBinding};
use crate::registry::InvokerRegistry;
use crate::transport::{Transport, UreqTransport};

/// Fixed path segment under which the REST API is served.
pub const API_CONTEXT_ROOT: &str = "comb/v1/d/";

/// `scheme://host[:port]/comb/v1/d/`, the prefix of every operation URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiRoot(Arc<str>);

impl ApiRoot {
    /// Derives the api root from a server URL. Any path, query or fragment
    /// on `host` is dropped; the port is kept only when it is not the
    /// scheme's default.
    pub fn from_url(host: &Url) -> Result<Self> {
        let name = host
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| BeehiveError::invalid_argument("destination URL has no host"))?;
        let mut root = format!("{}://{}", host.scheme(), name);
        if let Some(port) = host.port() {
            root.push_str(&format!(":{port}"));
        }
        root.push('/');
        root.push_str(API_CONTEXT_ROOT);
        Ok(Self(root.into()))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(root: &str) -> Self {
        Self(root.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends an operation path.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path.trim_start_matches('/'))
    }
}

impl fmt::Display for ApiRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds `Basic base64(user:password)`.
///
/// Rejects an empty user or password, and a user containing `:` (the
/// delimiter between the two). Surrounding whitespace on `user` is trimmed.
pub fn basic_auth_header(user: &str, password: &str) -> Result<String> {
    if user.is_empty() || password.is_empty() {
        return Err(BeehiveError::invalid_argument(
            "user name or password is not specified",
        ));
    }
    if user.contains(':') {
        return Err(BeehiveError::invalid_argument(
            "user name must not contain \":\"",
        ));
    }
    let credentials = format!("{}:{}", user.trim(), password);
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    Ok(format!("Basic {encoded}"))
}

/// Opens sessions over a given transport with a given invoker registry.
///
/// `BeehiveContext::open*` use `Connector::default()`: a `ureq` transport
/// configured from the environment and the standard registry.
#[derive(Clone)]
pub struct Connector {
    transport: Arc<dyn Transport>,
    registry: Arc<InvokerRegistry>,
}

impl Connector {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            registry: Arc::new(InvokerRegistry::standard()),
        }
    }

    pub fn with_config(config: &ClientConfig) -> Self {
        Self::new(Arc::new(UreqTransport::new(config)))
    }

    pub fn with_registry(mut self, registry: InvokerRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Logs in with a user name and password.
    ///
    /// Input is validated before anything is sent.
    pub fn login(&self, host: &str, user: &str, password: &str) -> Result<BeehiveContext> {
        let header = basic_auth_header(user, password)?;
        self.login_with_header(host, &header)
    }

    /// Logs in with a ready-made `Authorization` header value.
    pub fn login_with_header(&self, host: &str, basic_auth: &str) -> Result<BeehiveContext> {
        if host.trim().is_empty() {
            return Err(BeehiveError::invalid_argument(
                "destination URL is not specified",
            ));
        }
        if basic_auth.trim().is_empty() {
            return Err(BeehiveError::invalid_argument(
                "basic auth header is not specified",
            ));
        }
        let url = Url::parse(host.trim()).map_err(|e| {
            BeehiveError::invalid_argument(format!("destination URL is invalid: {e}"))
        })?;
        let api_root = ApiRoot::from_url(&url)?;
        let domain = url.host_str().unwrap_or_default().to_string();

        let credential = self.handshake(&api_root, basic_auth, &domain)?;
        Ok(BeehiveContext {
            api_root,
            credential: Arc::new(credential),
            transport: Arc::clone(&self.transport),
            registry: Arc::clone(&self.registry),
        })
    }

    fn handshake(&self, api_root: &ApiRoot, basic_auth: &str, domain: &str) -> Result<Credential> {
        let mut call = CallState::default();
        call.merge_header("Authorization".to_string(), basic_auth.to_string());
        let request = build_request(&SESSION_LOGIN, api_root, None, &call)?;

        debug!(url = %request.url, "logging in to Beehive");
        let response = classify(&SESSION_LOGIN, self.transport.execute(&request))?;

        let set_cookie = response.header_values("Set-Cookie");
        if set_cookie.is_empty() {
            return Err(BeehiveError::illegal_state("cookie is not set"));
        }
        let cookie = SessionCookie::find(&set_cookie, SESSION_COOKIE_NAME, domain)?
            .ok_or_else(|| {
                BeehiveError::illegal_state(format!("{SESSION_COOKIE_NAME} is not set"))
            })?;

        let token = response
            .require_body()?
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| BeehiveError::illegal_state("token is not set"))?;

        debug!(domain, "logged in to Beehive");
        Ok(Credential::new(cookie, token.to_string()))
    }
}

impl Default for Connector {
    fn default() -> Self {
        Self::with_config(&ClientConfig::from_env())
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// A logged-in session: api root plus credential.
///
/// There is no logout; the session ends when the context is dropped.
#[derive(Clone)]
pub struct BeehiveContext {
    api_root: ApiRoot,
    credential: Arc<Credential>,
    transport: Arc<dyn Transport>,
    registry: Arc<InvokerRegistry>,
}

impl BeehiveContext {
    /// Logs in to `host` (e.g. `https://beehive.example.com`) with a user name
    /// and password.
    pub fn open(host: &str, user: &str, password: &str) -> Result<Self> {
        Connector::default().login(host, user, password)
    }

    /// Logs in to `host` with a `Basic ...` header value.
    pub fn open_with_header(host: &str, basic_auth: &str) -> Result<Self> {
        Connector::default().login_with_header(host, basic_auth)
    }

    pub fn api_root(&self) -> &ApiRoot {
        &self.api_root
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// A fresh invoker for `kind`, bound to this session.
    ///
    /// Fails with `IllegalState` when `kind` is not in this context's
    /// registry.
    pub fn get_invoker(&self, kind: OperationKind) -> Result<Invoker> {
        let session = SessionBinding::new(
            self.api_root.clone(),
            Arc::clone(&self.credential),
            Arc::clone(&self.transport),
        );
        self.registry.instantiate(kind, session)
    }
}

impl fmt::Debug for BeehiveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeehiveContext")
            .field("api_root", &self.api_root)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
