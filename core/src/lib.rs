//! Synchronous client core for the Beehive collaboration REST API.
//!
//! # Overview
//! A `BeehiveContext` logs in once (`session/login`) and keeps the resulting
//! `Credential`. Every REST operation is reached through an `Invoker`
//! obtained from the context, which binds the operation's `ApiDefinition` to
//! the session's api root and credential. Invoking performs one blocking HTTP
//! exchange and classifies the outcome into a `BeehiveResponse` or a
//! `BeehiveError`.
//!
//! # Design
//! - Operations are data (`definition`), instantiated through an
//!   `InvokerRegistry` populated up front rather than per-kind factory code.
//! - The transport returns every response as data; `classify` alone decides
//!   what is an error.
//! - `Credential` and `SessionBinding` have no public constructors, so an
//!   unauthenticated invoker cannot be built.
//! - No retries, caching or logout.

pub mod classify;
pub mod config;
pub mod context;
pub mod credential;
pub mod definition;
pub mod error;
pub mod http;
pub mod invoker;
pub mod model;
pub mod registry;
pub mod response;
pub mod transport;
pub mod wire_time;

pub use config::ClientConfig;
pub use context::{basic_auth_header, ApiRoot, BeehiveContext, Connector};
pub use credential::{Credential, SessionCookie};
pub use definition::{ApiDefinition, OperationKind};
pub use error::{ApiFault, BeehiveError, Fault, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use invoker::{Invoker, SessionBinding};
pub use registry::{InvokerFactory, InvokerRegistry};
pub use response::{BeehiveBody, BeehiveResponse};
pub use transport::{Transport, TransportError, TransportErrorKind, UreqTransport};
