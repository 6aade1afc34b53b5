use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, RestFault, CALENDAR_ID, TOKEN_HEADER};
use serde_json::{json, Value};
use axum::routing::RouterIntoService;
use tower::{Service, ServiceExt};

const ALICE_BASIC: &str = "Basic YWxpY2U6c2VjcmV0";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn login_request(authorization: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/comb/v1/d/session/login")
        .header(http::header::AUTHORIZATION, authorization)
        .body(String::new())
        .unwrap()
}

struct Session {
    cookie: String,
    token: String,
}

impl Session {
    fn request(&self, method: &str, uri: &str, body: Option<Value>) -> Request<String> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::COOKIE, &self.cookie)
            .header(TOKEN_HEADER, &self.token);
        match body {
            Some(body) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body.to_string())
                .unwrap(),
            None => builder.body(String::new()).unwrap(),
        }
    }
}

async fn open_session(app: &mut RouterIntoService<String>) -> Session {
    let resp = ServiceExt::ready(app)
        .await
        .unwrap()
        .call(login_request(ALICE_BASIC))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .headers()
        .get_all(http::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .find(|v| v.starts_with("JSESSIONID="))
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string();
    let body: Value = body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();
    Session { cookie, token }
}

fn creator(name: &str) -> Value {
    json!({
        "beeType": "meetingCreator",
        "calendar": { "beeType": "beeId", "id": CALENDAR_ID },
        "meetingUpdater": {
            "beeType": "meetingUpdater",
            "name": name,
            "start": "2016-06-05T13:00:00+09:00",
            "end": "2016-06-05T14:00:00+09:00"
        },
        "type": "MEETING"
    })
}

// --- login ---

#[tokio::test]
async fn login_sets_session_cookie_and_token() {
    let resp = app().oneshot(login_request(ALICE_BASIC)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let cookies: Vec<_> = resp
        .headers()
        .get_all(http::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("JSESSIONID=")));

    let body: Value = body_json(resp).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_wrong_password_returns_401_fault() {
    // alice:wrong
    let resp = app().oneshot(login_request("Basic YWxpY2U6d3Jvbmc=")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let fault: RestFault = body_json(resp).await;
    assert_eq!(fault.bee_type, "restFault");
    assert_eq!(fault.code, "AUTHENTICATION_FAILED");
}

#[tokio::test]
async fn login_without_basic_returns_401() {
    let resp = app().oneshot(login_request("Bearer abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- authentication ---

#[tokio::test]
async fn workspace_without_session_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/comb/v1/d/my/workspace")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let fault: RestFault = body_json(resp).await;
    assert_eq!(fault.code, "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn workspace_with_unknown_session_returns_401() {
    let session = Session {
        cookie: "JSESSIONID=forged".to_string(),
        token: "forged".to_string(),
    };
    let resp = app()
        .oneshot(session.request("GET", "/comb/v1/d/my/workspace", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invitation_not_found_returns_404_fault() {
    let mut app = app().into_service();
    let session = open_session(&mut app).await;

    for method in ["GET", "DELETE"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(session.request(method, "/comb/v1/d/invt/missing", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method}");
        let fault: RestFault = body_json(resp).await;
        assert_eq!(fault.code, "NOT_FOUND");
    }
}

// --- full session lifecycle ---

#[tokio::test]
async fn session_lifecycle() {
    let mut app = app().into_service();

    let session = open_session(&mut app).await;

    // workspace
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(session.request("GET", "/comb/v1/d/my/workspace", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let workspace: Value = body_json(resp).await;
    assert_eq!(workspace["beeType"], "personalWorkspace");

    // calendar
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(session.request("GET", "/comb/v1/d/my/calendar", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let calendar: Value = body_json(resp).await;
    assert_eq!(calendar["collabId"]["id"], CALENDAR_ID);

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(session.request("POST", "/comb/v1/d/invt", Some(creator("Standup"))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = body_json(resp).await;
    assert_eq!(created["beeType"], "meeting");
    assert_eq!(created["name"], "Standup");
    let id = created["collabId"]["id"].as_str().unwrap().to_string();

    // read
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(session.request("GET", &format!("/comb/v1/d/invt/{id}"), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched["collabId"]["id"], id.as_str());

    // update: only the name changes
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(session.request(
            "PUT",
            &format!("/comb/v1/d/invt/{id}"),
            Some(json!({"beeType": "meetingUpdater", "name": "Retro"})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["name"], "Retro");
    assert_eq!(updated["start"], "2016-06-05T13:00:00+09:00");

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(session.request("DELETE", &format!("/comb/v1/d/invt/{id}"), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // read after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(session.request("GET", &format!("/comb/v1/d/invt/{id}"), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_wrong_bee_type() {
    let mut app = app().into_service();
    let session = open_session(&mut app).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(session.request(
            "POST",
            "/comb/v1/d/invt",
            Some(json!({"beeType": "meetingUpdater"})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let fault: RestFault = body_json(resp).await;
    assert_eq!(fault.code, "INVALID_PAYLOAD");
}
