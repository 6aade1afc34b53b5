//! Decoded result of a successful call.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BeehiveError, Result};
use crate::http::find_header;

/// Key of the resource-kind discriminator in Beehive JSON documents.
pub const BEE_TYPE: &str = "beeType";

/// Status, headers and (optionally) the decoded body of a call.
///
/// `body` is `None` for operations that answer without content (e.g. 204).
#[derive(Debug, Clone, PartialEq)]
pub struct BeehiveResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<BeehiveBody>,
}

impl BeehiveResponse {
    /// All values of the named header, compared case-insensitively.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        find_header(&self.headers, name)
    }

    /// The body, or `IllegalState` when the call produced none.
    pub fn require_body(&self) -> Result<&BeehiveBody> {
        self.body
            .as_ref()
            .ok_or_else(|| BeehiveError::illegal_state("response body is null"))
    }
}

/// A JSON response body.
#[derive(Debug, Clone, PartialEq)]
pub struct BeehiveBody {
    json: Value,
}

impl BeehiveBody {
    pub fn new(json: Value) -> Self {
        Self { json }
    }

    /// The `beeType` discriminator, if the document has one.
    pub fn bee_type(&self) -> Option<&str> {
        self.json.get(BEE_TYPE).and_then(Value::as_str)
    }

    pub fn json(&self) -> &Value {
        &self.json
    }

    pub fn into_json(self) -> Value {
        self.json
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.json.get(field)
    }

    /// JSON pointer lookup, e.g. `/collabId/id`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.json.pointer(pointer)
    }

    /// Decodes the whole body into a typed model.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.json).map_err(|e| {
            BeehiveError::illegal_state_caused_by("response body does not match the model", e)
        })
    }
}
