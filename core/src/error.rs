//! Error types for the Beehive client.
//!
//! # Design
//! Three kinds of failure reach the caller:
//! - `InvalidArgument`: the caller's input was rejected before any network
//!   activity.
//! - `ApiFault`: the remote call did not complete as requested (transport
//!   failure, unexpected status, server-reported fault).
//! - `IllegalState`: data the client depends on violated an invariant
//!   (missing cookie/token/body, unregistered operation kind).
//!
//! Nothing here is retried or suppressed; every error propagates to the
//! caller of `open*`, `get_invoker` or `invoke`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by every fallible operation of this crate.
#[derive(Debug, Error)]
pub enum BeehiveError {
    /// Caller input was structurally invalid. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The remote call failed.
    #[error(transparent)]
    ApiFault(#[from] ApiFault),

    /// An invariant the client relies on was violated.
    #[error("illegal state: {message}")]
    IllegalState {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BeehiveError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
            source: None,
        }
    }

    pub fn illegal_state_caused_by<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::IllegalState {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The fault, if this error came from the remote side.
    pub fn as_api_fault(&self) -> Option<&ApiFault> {
        match self {
            Self::ApiFault(fault) => Some(fault),
            _ => None,
        }
    }
}

/// A failed remote call.
///
/// `status` is `None` when the exchange never produced a response (the
/// transport failed); in that case `source` holds the transport error.
#[derive(Debug, Error)]
pub struct ApiFault {
    status: Option<u16>,
    fault: Option<Fault>,
    body: String,
    #[source]
    source: Option<TransportError>,
}

impl ApiFault {
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        let fault = serde_json::from_str::<Fault>(&body)
            .ok()
            .filter(Fault::is_reported);
        Self {
            status: Some(status),
            fault,
            body,
            source: None,
        }
    }

    pub(crate) fn from_transport(source: TransportError) -> Self {
        Self {
            status: None,
            fault: None,
            body: String::new(),
            source: Some(source),
        }
    }

    /// The HTTP status the server answered with.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The structured fault the server reported, if the body carried one.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// The raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn transport_error(&self) -> Option<&TransportError> {
        self.source.as_ref()
    }
}

impl fmt::Display for ApiFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.fault, &self.source) {
            (Some(status), Some(fault), _) => write!(f, "API fault (HTTP {status}): {fault}"),
            (Some(status), None, _) if self.body.is_empty() => {
                write!(f, "API fault (HTTP {status})")
            }
            (Some(status), None, _) => write!(f, "API fault (HTTP {status}): {}", self.body),
            (None, _, Some(source)) => write!(f, "API fault: {source}"),
            (None, _, None) => write!(f, "API fault"),
        }
    }
}

/// Fault detail as reported by the server.
///
/// Every field is optional: the server fills in what it knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fault {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bee_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Fault {
    /// Whether a decoded document actually describes a fault. Any JSON
    /// object decodes into `Fault`, so one carrying none of the fault
    /// markers is not taken as one.
    fn is_reported(&self) -> bool {
        self.bee_type.as_deref() == Some("restFault") || self.code.is_some() || self.message.is_some()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{code}] ")?;
        }
        f.write_str(self.message.as_deref().unwrap_or("no message"))?;
        if let Some(action) = &self.action {
            write!(f, " ({action})")?;
        }
        Ok(())
    }
}

/// A specialized Result type for Beehive operations.
pub type Result<T> = std::result::Result<T, BeehiveError>;
