//! In-memory stand-in for a Beehive server.
//!
//! Serves the subset of `/comb/v1/d/` the client covers: `session/login`,
//! `my/workspace`, `my/calendar` and invitation CRUD under `invt`. Sessions are
//! checked the way the real server does: a `JSESSIONID` cookie plus the
//! anti-CSRF token returned by login.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const API_ROOT: &str = "/comb/v1/d";
pub const SESSION_COOKIE: &str = "JSESSIONID";
pub const TOKEN_HEADER: &str = "x-beehive-anticsrf-token";
pub const CALENDAR_ID: &str = "334B:3BF0:clnd:38893C00F42F38A1E0404498C8A6612B000B1A7E0450";

/// The single account the server accepts.
#[derive(Clone, Debug)]
pub struct Account {
    pub user: String,
    pub password: String,
}

impl Account {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// `BEEHIVE_MOCK_USER` / `BEEHIVE_MOCK_PASSWORD`, falling back to the
    /// default account.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            user: std::env::var("BEEHIVE_MOCK_USER").unwrap_or(default.user),
            password: std::env::var("BEEHIVE_MOCK_PASSWORD").unwrap_or(default.password),
        }
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new("alice", "secret")
    }
}

/// Fault document returned on every error status.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestFault {
    pub bee_type: String,
    pub code: String,
    pub message: String,
}

#[derive(Default)]
struct Store {
    /// JSESSIONID -> (user, token)
    sessions: HashMap<String, (String, String)>,
    invitations: HashMap<String, Value>,
}

#[derive(Clone)]
pub struct AppState {
    account: Arc<Account>,
    store: Arc<RwLock<Store>>,
}

pub fn app() -> Router {
    app_with(Account::default())
}

pub fn app_with(account: Account) -> Router {
    let state = AppState {
        account: Arc::new(account),
        store: Arc::new(RwLock::new(Store::default())),
    };
    let api = Router::new()
        .route("/session/login", post(login))
        .route("/my/workspace", get(my_workspace))
        .route("/my/calendar", get(my_calendar))
        .route("/invt", post(create_invitation))
        .route(
            "/invt/{id}",
            get(read_invitation)
                .put(update_invitation)
                .delete(delete_invitation),
        );
    Router::new().nest(API_ROOT, api).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, account: Account) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(account)).await
}

fn fault(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = RestFault {
        bee_type: "restFault".to_string(),
        code: code.to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

fn decode_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, password) = text.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Resolves the caller's user from cookie + token, or the 401 to send.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, Response> {
    let unauthorized = || fault(StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED", "session is not valid");
    let session = session_cookie(headers).ok_or_else(unauthorized)?;
    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;

    let store = state.store.read().await;
    match store.sessions.get(&session) {
        Some((user, expected)) if expected == token => Ok(user.clone()),
        _ => Err(unauthorized()),
    }
}

async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some((user, password)) = decode_basic(&headers) else {
        return fault(StatusCode::UNAUTHORIZED, "AUTHENTICATION_REQUIRED", "basic credentials missing");
    };
    if user != state.account.user || password != state.account.password {
        return fault(StatusCode::UNAUTHORIZED, "AUTHENTICATION_FAILED", "invalid user name or password");
    }

    let session = Uuid::new_v4().simple().to_string();
    let token = Uuid::new_v4().to_string();
    state
        .store
        .write()
        .await
        .sessions
        .insert(session.clone(), (user.clone(), token.clone()));
    info!(%user, "session opened");

    let cookies = AppendHeaders([
        (header::SET_COOKIE, "ORA_BHS_LB=node1; Path=/".to_string()),
        (
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}={session}; Path=/comb; HttpOnly"),
        ),
    ]);
    (StatusCode::OK, cookies, Json(json!({ "token": token }))).into_response()
}

async fn my_workspace(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    Json(json!({
        "beeType": "personalWorkspace",
        "collabId": { "beeType": "collabId", "id": format!("334B:3BF0:wspr:{user}") },
        "name": format!("{user}'s workspace"),
        "defaultCalendar": { "beeType": "beeId", "id": CALENDAR_ID }
    }))
    .into_response()
}

async fn my_calendar(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = authenticate(&state, &headers).await {
        return resp;
    }
    Json(json!({
        "beeType": "calendar",
        "collabId": { "beeType": "collabId", "id": CALENDAR_ID },
        "name": "Calendar"
    }))
    .into_response()
}

/// Copies the updater fields the mock keeps onto `meeting`. `null` and
/// absent fields leave the existing value alone.
fn apply_updater(meeting: &mut Map<String, Value>, updater: &Value) {
    for field in ["name", "start", "end", "status", "locationName", "textDescription"] {
        if let Some(value) = updater.get(field).filter(|v| !v.is_null()) {
            meeting.insert(field.to_string(), value.clone());
        }
    }
}

async fn create_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    if let Err(resp) = authenticate(&state, &headers).await {
        return resp;
    }
    if input.get("beeType").and_then(Value::as_str) != Some("meetingCreator") {
        return fault(StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", "expected a meetingCreator");
    }
    let Some(calendar) = input.get("calendar").cloned() else {
        return fault(StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", "calendar is required");
    };

    let id = format!("334B:3BF0:invt:{}", Uuid::new_v4().simple());
    let mut meeting = Map::new();
    meeting.insert("beeType".to_string(), json!("meeting"));
    meeting.insert("collabId".to_string(), json!({ "beeType": "collabId", "id": id }));
    meeting.insert("calendar".to_string(), calendar);
    if let Some(updater) = input.get("meetingUpdater") {
        apply_updater(&mut meeting, updater);
    }
    let meeting = Value::Object(meeting);

    state.store.write().await.invitations.insert(id.clone(), meeting.clone());
    debug!(%id, "invitation created");
    Json(meeting).into_response()
}

async fn read_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authenticate(&state, &headers).await {
        return resp;
    }
    match state.store.read().await.invitations.get(&id) {
        Some(meeting) => Json(meeting.clone()).into_response(),
        None => fault(StatusCode::NOT_FOUND, "NOT_FOUND", format!("invitation {id} not found")),
    }
}

async fn update_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Response {
    if let Err(resp) = authenticate(&state, &headers).await {
        return resp;
    }
    if input.get("beeType").and_then(Value::as_str) != Some("meetingUpdater") {
        return fault(StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", "expected a meetingUpdater");
    }
    let mut store = state.store.write().await;
    let Some(Value::Object(meeting)) = store.invitations.get_mut(&id) else {
        return fault(StatusCode::NOT_FOUND, "NOT_FOUND", format!("invitation {id} not found"));
    };
    apply_updater(meeting, &input);
    Json(Value::Object(meeting.clone())).into_response()
}

async fn delete_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authenticate(&state, &headers).await {
        return resp;
    }
    match state.store.write().await.invitations.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => fault(StatusCode::NOT_FOUND, "NOT_FOUND", format!("invitation {id} not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn decodes_basic_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic YWxpY2U6c2VjcmV0"));
        assert_eq!(
            decode_basic(&headers),
            Some(("alice".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn rejects_non_basic_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(decode_basic(&headers), None);
    }

    #[test]
    fn finds_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("ORA_BHS_LB=node1; JSESSIONID=abc"));
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn updater_skips_null_fields() {
        let mut meeting = Map::new();
        meeting.insert("name".to_string(), json!("Old"));
        meeting.insert("locationName".to_string(), json!("Room 1"));
        apply_updater(&mut meeting, &json!({"name": "New", "locationName": null}));
        assert_eq!(meeting["name"], "New");
        assert_eq!(meeting["locationName"], "Room 1");
    }

    #[test]
    fn fault_serializes_camel_case() {
        let fault = RestFault {
            bee_type: "restFault".to_string(),
            code: "NOT_FOUND".to_string(),
            message: "gone".to_string(),
        };
        let json = serde_json::to_value(&fault).unwrap();
        assert_eq!(json["beeType"], "restFault");
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
