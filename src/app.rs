use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/api/count", get(handlers::get_state))
        .route("/api/increment", post(handlers::increment))
        .route("/api/admin", post(handlers::admin))
        .with_state(state)
}
