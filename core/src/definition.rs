//! Operation descriptors for the Beehive REST API.
//!
//! # Design
//! Each REST operation is a `const ApiDefinition`: method, path template
//! relative to the API root, whether a JSON body is sent, and what a
//! successful answer looks like. Descriptors are plain data, so adding an
//! operation means adding a constant and registering it; no invoker code
//! changes.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::http::HttpMethod;

/// Placeholder for the path parameter in a path template.
pub const PATH_PARAM: &str = "{id}";

/// Bytes left as-is in a path value: RFC 3986 unreserved characters plus `:`,
/// which Beehive ids are made of.
const PATH_VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':');

/// Identifies one REST operation, e.g. `invt/delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKind(&'static str);

impl OperationKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Shape of the body on a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseBody {
    /// A JSON document is required.
    Json,
    /// No body is expected; any bytes sent are ignored.
    Empty,
}

/// What a successful answer to an operation looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ExpectedResponse {
    pub const OK_JSON: Self = Self {
        status: 200,
        body: ResponseBody::Json,
    };
    pub const NO_CONTENT: Self = Self {
        status: 204,
        body: ResponseBody::Empty,
    };
}

/// Fixed description of one REST operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiDefinition {
    pub kind: OperationKind,
    pub method: HttpMethod,
    /// Relative to the API root; may contain one `{id}` slot.
    pub path: &'static str,
    /// Whether a JSON request body must be supplied.
    pub request_body: bool,
    pub response: ExpectedResponse,
}

impl ApiDefinition {
    pub fn has_path_param(&self) -> bool {
        self.path.contains(PATH_PARAM)
    }

    /// The path with the `{id}` slot filled in.
    ///
    /// The value is percent-encoded as a single segment, so `/`, `?`, `#`
    /// and the like cannot change which resource is addressed.
    ///
    /// Returns `None` when the template has a slot and no value was supplied.
    /// A value supplied for a path without a slot is ignored.
    pub fn resolve_path(&self, value: Option<&str>) -> Option<String> {
        if !self.has_path_param() {
            return Some(self.path.to_string());
        }
        value.map(|v| {
            let encoded = utf8_percent_encode(v, PATH_VALUE_ENCODE_SET).to_string();
            self.path.replace(PATH_PARAM, &encoded)
        })
    }
}

/// `POST session/login`. Issued by the context itself, never registered.
pub const SESSION_LOGIN: ApiDefinition = ApiDefinition {
    kind: OperationKind::new("session/login"),
    method: HttpMethod::Post,
    path: "session/login",
    request_body: false,
    response: ExpectedResponse::OK_JSON,
};

/// `GET my/workspace`: the caller's personal workspace.
pub const MY_WORKSPACE: ApiDefinition = ApiDefinition {
    kind: OperationKind::new("my/workspace"),
    method: HttpMethod::Get,
    path: "my/workspace",
    request_body: false,
    response: ExpectedResponse::OK_JSON,
};

/// `GET my/calendar`: the caller's default calendar.
pub const MY_CALENDAR: ApiDefinition = ApiDefinition {
    kind: OperationKind::new("my/calendar"),
    method: HttpMethod::Get,
    path: "my/calendar",
    request_body: false,
    response: ExpectedResponse::OK_JSON,
};

/// `POST invt`: create a meeting invitation from a `MeetingCreator`.
pub const INVT_CREATE: ApiDefinition = ApiDefinition {
    kind: OperationKind::new("invt/create"),
    method: HttpMethod::Post,
    path: "invt",
    request_body: true,
    response: ExpectedResponse::OK_JSON,
};

pub const INVT_READ: ApiDefinition = ApiDefinition {
    kind: OperationKind::new("invt/read"),
    method: HttpMethod::Get,
    path: "invt/{id}",
    request_body: false,
    response: ExpectedResponse::OK_JSON,
};

/// `PUT invt/{id}`: apply a `MeetingUpdater`.
pub const INVT_UPDATE: ApiDefinition = ApiDefinition {
    kind: OperationKind::new("invt/update"),
    method: HttpMethod::Put,
    path: "invt/{id}",
    request_body: true,
    response: ExpectedResponse::OK_JSON,
};

pub const INVT_DELETE: ApiDefinition = ApiDefinition {
    kind: OperationKind::new("invt/delete"),
    method: HttpMethod::Delete,
    path: "invt/{id}",
    request_body: false,
    response: ExpectedResponse::NO_CONTENT,
};

/// Every operation a standard registry exposes.
pub static STANDARD: [&ApiDefinition; 6] = [
    &MY_WORKSPACE,
    &MY_CALENDAR,
    &INVT_CREATE,
    &INVT_READ,
    &INVT_UPDATE,
    &INVT_DELETE,
];
