//! Turns a raw exchange outcome into a typed result.
//!
//! The transport never raises on HTTP status, so this is the one place that
//! decides whether a call succeeded:
//!
//! | Outcome | Result |
//! |---|---|
//! | transport failure | `ApiFault` carrying the `TransportError` |
//! | expected status, `Empty` body | `Ok`, `body: None` |
//! | expected status, `Json` body | `Ok` with decoded body, or `IllegalState` if empty/malformed |
//! | any other status | `ApiFault` with status, raw body and decoded `Fault` if present |

use serde_json::Value;
use tracing::trace;

use crate::definition::{ApiDefinition, ResponseBody};
use crate::error::{ApiFault, BeehiveError, Result};
use crate::http::HttpResponse;
use crate::response::{BeehiveBody, BeehiveResponse};
use crate::transport::TransportError;

/// Classifies the outcome of executing `definition`.
pub fn classify(
    definition: &ApiDefinition,
    outcome: std::result::Result<HttpResponse, TransportError>,
) -> Result<BeehiveResponse> {
    let response = outcome.map_err(ApiFault::from_transport)?;
    classify_response(definition, response)
}

/// Classifies a response that did arrive.
pub fn classify_response(
    definition: &ApiDefinition,
    response: HttpResponse,
) -> Result<BeehiveResponse> {
    trace!(kind = %definition.kind, status = response.status, "classifying response");

    if response.status != definition.response.status {
        return Err(ApiFault::from_status(response.status, response.body).into());
    }

    let body = match definition.response.body {
        ResponseBody::Empty => None,
        ResponseBody::Json => Some(decode_body(definition, &response.body)?),
    };

    Ok(BeehiveResponse {
        status: response.status,
        headers: response.headers,
        body,
    })
}

fn decode_body(definition: &ApiDefinition, raw: &str) -> Result<BeehiveBody> {
    if raw.trim().is_empty() {
        return Err(BeehiveError::illegal_state(format!(
            "{}: response body is null",
            definition.kind
        )));
    }
    let json: Value = serde_json::from_str(raw).map_err(|e| {
        BeehiveError::illegal_state_caused_by(
            format!("{}: response body is not valid JSON", definition.kind),
            e,
        )
    })?;
    Ok(BeehiveBody::new(json))
}
