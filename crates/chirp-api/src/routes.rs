use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::session::attach_session;
use crate::state::AppState;
use crate::{chirps, interactions, profile};

/// Page and API routes. Every route except `/health` sees a [`Viewer`](crate::session::Viewer).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/user", get(profile::profile_page))
        .route("/user/", get(profile::profile_page))
        .route("/user/fetch_chirps", get(chirps::fetch_chirps))
        .route("/interact_chirp", post(interactions::interact_chirp))
        .layer(middleware::from_fn_with_state(state.clone(), attach_session))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
