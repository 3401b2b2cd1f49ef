use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use be_there::{
    models::{AdminResponse, ErrorBody, IncrementResponse, StateResponse},
    router,
    vote::{tracker_for, VoteStrategy, VOTER_COOKIE},
    AppState, StateStore,
};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use tower::ServiceExt;

const PASSWORD: &str = "open-sesame";

fn app(strategy: VoteStrategy) -> Router {
    router(AppState::new(
        StateStore::in_memory(),
        tracker_for(strategy),
        PASSWORD,
    ))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn json<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

fn increment_from(addr: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/increment");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    let peer: SocketAddr = addr.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

fn admin(body: serde_json::Value) -> Request<Body> {
    Request::post("/api/admin")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn voter_cookie(headers: &axum::http::HeaderMap) -> String {
    let raw = headers
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn state_starts_at_defaults() {
    let app = app(VoteStrategy::Cookie);
    let (status, headers, body) = send(&app, Request::get("/api/state").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    let state: StateResponse = json(&body);
    assert_eq!(state.count, 0);
    assert_eq!(state.event_text, "Event Text");
    assert!(!state.clicked);
}

#[tokio::test]
async fn count_alias_matches_state() {
    let app = app(VoteStrategy::Cookie);
    let (status, _, body) = send(&app, Request::get("/api/count").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let state: StateResponse = json(&body);
    assert_eq!(state.count, 0);
}

#[tokio::test]
async fn cookie_voters_are_counted_once() {
    let app = app(VoteStrategy::Cookie);

    let (status, headers, body) = send(&app, increment_from("127.0.0.1:1000", None)).await;
    assert_eq!(status, StatusCode::OK);
    let first: IncrementResponse = json(&body);
    assert_eq!(first.count, 1);
    assert!(first.clicked);

    let cookie = voter_cookie(&headers);
    assert!(cookie.starts_with(&format!("{VOTER_COOKIE}=")));

    let (_, headers, body) = send(&app, increment_from("127.0.0.1:1000", Some(&cookie))).await;
    let again: IncrementResponse = json(&body);
    assert_eq!(again.count, 1);
    assert!(again.clicked);
    assert!(headers.get(header::SET_COOKIE).is_none());

    let request = Request::get("/api/state")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = send(&app, request).await;
    let state: StateResponse = json(&body);
    assert!(state.clicked);

    let (_, _, body) = send(&app, increment_from("127.0.0.1:1000", None)).await;
    let other: IncrementResponse = json(&body);
    assert_eq!(other.count, 2);
}

#[tokio::test]
async fn address_voters_are_rejected_server_side() {
    let app = app(VoteStrategy::Address);

    let (_, headers, body) = send(&app, increment_from("10.1.1.1:5000", None)).await;
    assert_eq!(json::<IncrementResponse>(&body).count, 1);
    assert!(headers.get(header::SET_COOKIE).is_none());

    let (_, _, body) = send(&app, increment_from("10.1.1.1:6000", None)).await;
    assert_eq!(json::<IncrementResponse>(&body).count, 1);

    let (_, _, body) = send(&app, increment_from("10.1.1.2:5000", None)).await;
    assert_eq!(json::<IncrementResponse>(&body).count, 2);

    let mut forwarded = increment_from("10.1.1.1:5000", None);
    forwarded
        .headers_mut()
        .insert("x-forwarded-for", "203.0.113.9".parse().unwrap());
    let (_, _, body) = send(&app, forwarded).await;
    assert_eq!(json::<IncrementResponse>(&body).count, 3);
}

#[tokio::test]
async fn client_flag_is_trusted() {
    let app = app(VoteStrategy::Client);

    let (_, _, body) = send(&app, increment_from("127.0.0.1:1", None)).await;
    assert_eq!(json::<IncrementResponse>(&body).count, 1);

    let mut flagged = increment_from("127.0.0.1:1", None);
    flagged
        .headers_mut()
        .insert("x-be-there-clicked", "true".parse().unwrap());
    let (_, _, body) = send(&app, flagged).await;
    assert_eq!(json::<IncrementResponse>(&body).count, 1);
}

#[tokio::test]
async fn admin_rejects_wrong_password() {
    let app = app(VoteStrategy::Cookie);
    send(&app, increment_from("127.0.0.1:1", None)).await;

    let (status, _, body) = send(
        &app,
        admin(serde_json::json!({ "password": "nope", "eventText": "Hacked", "resetCount": true })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json::<ErrorBody>(&body).error, "invalid password");

    let (_, _, body) = send(&app, Request::get("/api/state").body(Body::empty()).unwrap()).await;
    let state: StateResponse = json(&body);
    assert_eq!(state.count, 1);
    assert_eq!(state.event_text, "Event Text");
}

#[tokio::test]
async fn admin_rejects_malformed_body() {
    let app = app(VoteStrategy::Cookie);
    let request = Request::post("/api/admin")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"password\":"))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!json::<ErrorBody>(&body).error.is_empty());

    let (status, _, _) = send(&app, admin(serde_json::json!({ "eventText": "no password" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_edits_text_and_resets() {
    let app = app(VoteStrategy::Cookie);
    let (_, headers, _) = send(&app, increment_from("127.0.0.1:1", None)).await;
    let cookie = voter_cookie(&headers);

    let (status, _, body) = send(
        &app,
        admin(serde_json::json!({ "password": PASSWORD, "eventText": "Gala 2025" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let edited: AdminResponse = json(&body);
    assert_eq!(edited.event_text, "Gala 2025");
    assert_eq!(edited.count, 1);

    let (_, _, body) = send(
        &app,
        admin(serde_json::json!({ "password": PASSWORD, "resetCount": true })),
    )
    .await;
    let reset: AdminResponse = json(&body);
    assert_eq!(reset.count, 0);
    assert_eq!(reset.event_text, "Gala 2025");

    let (_, _, body) = send(&app, increment_from("127.0.0.1:1", Some(&cookie))).await;
    assert_eq!(json::<IncrementResponse>(&body).count, 1);
}

#[tokio::test]
async fn index_renders_escaped_state() {
    let app = app(VoteStrategy::Cookie);
    send(
        &app,
        admin(serde_json::json!({ "password": PASSWORD, "eventText": "<Gala> & Dinner" })),
    )
    .await;

    let (status, headers, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("&lt;Gala&gt; &amp; Dinner"));
    assert!(html.contains("0 people will be there."));
}
