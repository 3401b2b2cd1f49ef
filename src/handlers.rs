use crate::admin;
use crate::errors::AppError;
use crate::models::{AdminRequest, IncrementResponse, StateResponse};
use crate::state::AppState;
use crate::ui::render_index;
use crate::vote::ClientRequest;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use tracing::info;

type Peer = Option<ConnectInfo<SocketAddr>>;

pub async fn index(State(state): State<AppState>, headers: HeaderMap, peer: Peer) -> Html<String> {
    let client = client_request(&headers, peer);
    let current = state.store.get().await;
    let clicked = state.tracker.has_voted(&client, &current);
    Html(render_index(&current, clicked))
}

pub async fn get_state(State(state): State<AppState>, headers: HeaderMap, peer: Peer) -> Response {
    let client = client_request(&headers, peer);
    let current = state.store.get().await;
    let clicked = state.tracker.has_voted(&client, &current);

    no_store(Json(StateResponse {
        count: current.count,
        event_text: current.event_text,
        clicked,
    }))
}

pub async fn increment(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Peer,
) -> Result<Response, AppError> {
    let client = client_request(&headers, peer);
    let current = state.store.get().await;

    if state.tracker.has_voted(&client, &current) {
        return Ok(no_store(Json(IncrementResponse {
            count: current.count,
            clicked: true,
        })));
    }

    let ballot = state.tracker.ballot(&client);
    let count = state.store.increment(ballot.voter_key.as_deref()).await?;
    info!(count, strategy = %state.tracker.strategy(), "vote recorded");

    let mut response = no_store(Json(IncrementResponse {
        count,
        clicked: true,
    }));
    if let Some(cookie) = ballot.set_cookie {
        let value = HeaderValue::from_str(&cookie).map_err(AppError::internal)?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

pub async fn admin(
    State(state): State<AppState>,
    payload: Result<Json<AdminRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let response = admin::apply(&state.store, &state.admin_password, request).await?;
    Ok(no_store(Json(response)))
}

fn client_request(headers: &HeaderMap, peer: Peer) -> ClientRequest<'_> {
    ClientRequest::new(headers, peer.map(|ConnectInfo(addr)| addr))
}

fn no_store(body: impl IntoResponse) -> Response {
    ([(header::CACHE_CONTROL, "no-store")], body).into_response()
}
