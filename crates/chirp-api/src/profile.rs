use axum::{
    Extension,
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::warn;

use chirp_types::models::UserProfile;

use crate::error::ApiError;
use crate::page;
use crate::session::Viewer;
use crate::state::{AppState, run_db};

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub id: Option<String>,
}

/// GET /user?id=USERNAME: profile header plus an empty feed container.
pub async fn profile_page(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Html<String>, ApiError> {
    let username = query
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingUserId)?;

    let user = run_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::UserNotFound)?;
    let profile = UserProfile::from(user);

    let deferred = viewer.id().and_then(|id| state.flash.take(id));
    if let Some(message) = &deferred {
        warn!(viewer = viewer.id(), "Deferred session error: {}", message);
    }

    Ok(Html(page::render_profile(&profile, &viewer, deferred.as_deref())))
}
