//! One configured REST call.
//!
//! # Design
//! An `Invoker` is a descriptor (`ApiDefinition`) bound to a live session
//! (`SessionBinding`) plus the per-call inputs: path value, JSON payload and
//! extra headers. `build_request` turns that into a plain `HttpRequest`;
//! `invoke` executes it on the session's transport and hands the outcome to
//! `classify`. Invokers are only obtainable from `BeehiveContext::get_invoker`,
//! because a `SessionBinding` cannot be built outside this crate.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::classify::classify;
use crate::context::ApiRoot;
use crate::credential::Credential;
use crate::definition::ApiDefinition;
use crate::error::{BeehiveError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::response::BeehiveResponse;
use crate::transport::Transport;

/// The (api root, credential) pair of a logged-in session, plus the transport
/// its calls go through.
#[derive(Clone)]
pub struct SessionBinding {
    api_root: ApiRoot,
    credential: Arc<Credential>,
    transport: Arc<dyn Transport>,
}

impl SessionBinding {
    pub(crate) fn new(
        api_root: ApiRoot,
        credential: Arc<Credential>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_root,
            credential,
            transport,
        }
    }

    pub fn api_root(&self) -> &ApiRoot {
        &self.api_root
    }

    pub fn credential(&self) -> &Arc<Credential> {
        &self.credential
    }
}

impl fmt::Debug for SessionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBinding")
            .field("api_root", &self.api_root)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

/// Per-call inputs of an invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CallState {
    pub path_value: Option<String>,
    pub payload: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl CallState {
    pub fn merge_header(&mut self, name: String, value: String) {
        merge_header(&mut self.headers, name, value);
    }
}

/// A single configured call to one Beehive operation.
#[derive(Debug)]
pub struct Invoker {
    definition: &'static ApiDefinition,
    session: SessionBinding,
    call: CallState,
}

impl Invoker {
    /// Binds `definition` to a session. Used by registry factories.
    pub fn new(definition: &'static ApiDefinition, session: SessionBinding) -> Self {
        Self {
            definition,
            session,
            call: CallState::default(),
        }
    }

    pub fn definition(&self) -> &'static ApiDefinition {
        self.definition
    }

    pub fn api_root(&self) -> &ApiRoot {
        self.session.api_root()
    }

    pub fn credential(&self) -> &Arc<Credential> {
        self.session.credential()
    }

    /// Value for the `{id}` slot of the path. Ignored when the path has none.
    pub fn set_path_value(&mut self, value: impl Into<String>) -> &mut Self {
        self.call.path_value = Some(value.into());
        self
    }

    pub fn path_value(&self) -> Option<&str> {
        self.call.path_value.as_deref()
    }

    /// Encodes `body` as the JSON request payload.
    ///
    /// Fields set to `None` are left out by the models' serde attributes.
    pub fn set_request_payload<T: Serialize + ?Sized>(&mut self, body: &T) -> Result<&mut Self> {
        let json = serde_json::to_value(body).map_err(|e| {
            BeehiveError::invalid_argument(format!("request payload cannot be encoded: {e}"))
        })?;
        self.call.payload = Some(json);
        Ok(self)
    }

    pub fn payload(&self) -> Option<&Value> {
        self.call.payload.as_ref()
    }

    /// Merges extra headers into the request. A header already present
    /// (compared case-insensitively) is replaced.
    pub fn add_header<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.call.merge_header(name.into(), value.into());
        }
        self
    }

    /// The request `invoke` would send.
    pub fn build_request(&self) -> Result<HttpRequest> {
        build_request(
            self.definition,
            self.session.api_root(),
            Some(self.session.credential.as_ref()),
            &self.call,
        )
    }

    /// Performs the call. Exactly one exchange, never retried.
    pub fn invoke(&self) -> Result<BeehiveResponse> {
        let request = self.build_request()?;
        debug!(
            kind = %self.definition.kind,
            method = %request.method,
            url = %request.url,
            "invoking Beehive operation"
        );
        let outcome = self.session.transport.execute(&request);
        classify(self.definition, outcome)
    }

    /// Classifies a response obtained elsewhere for this invoker's operation.
    pub fn parse_response(&self, response: HttpResponse) -> Result<BeehiveResponse> {
        crate::classify::classify_response(self.definition, response)
    }
}

/// Builds the request for `definition`. `credential` is `None` only for the
/// login handshake.
pub(crate) fn build_request(
    definition: &ApiDefinition,
    api_root: &ApiRoot,
    credential: Option<&Credential>,
    call: &CallState,
) -> Result<HttpRequest> {
    let path = definition
        .resolve_path(call.path_value.as_deref())
        .ok_or_else(|| {
            BeehiveError::invalid_argument(format!(
                "{} requires a path value ({})",
                definition.kind, definition.path
            ))
        })?;

    let body = match (&call.payload, definition.request_body) {
        (Some(payload), true) => Some(payload.to_string()),
        (None, true) => {
            return Err(BeehiveError::invalid_argument(format!(
                "{} requires a request payload",
                definition.kind
            )))
        }
        (_, false) => None,
    };

    let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
    if body.is_some() {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    if let Some(credential) = credential {
        headers.extend(credential.auth_headers());
    }
    for (name, value) in &call.headers {
        merge_header(&mut headers, name.clone(), value.clone());
    }

    Ok(HttpRequest {
        method: definition.method,
        url: api_root.join(&path),
        headers,
        body,
    })
}

fn merge_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|entry| entry.0.eq_ignore_ascii_case(&name)) {
        Some(existing) => existing.1 = value,
        None => headers.push((name, value)),
    }
}
