use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::debug;

use chirp_types::PAGE_SIZE;
use chirp_types::api::FetchChirpsQuery;
use chirp_types::models::Post;

use crate::error::ApiError;
use crate::session::Viewer;
use crate::state::{AppState, run_db};

/// GET /user/fetch_chirps?offset=N&user=ID: one page of a user's chirps,
/// newest first. A page shorter than `PAGE_SIZE` means the feed is exhausted.
pub async fn fetch_chirps(
    State(state): State<AppState>,
    Query(query): Query<FetchChirpsQuery>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, ApiError> {
    let offset = u32::try_from(query.offset).map_err(|_| ApiError::InvalidOffset)?;
    let user = query.user;
    let viewer_id = viewer.id();

    let rows = run_db(&state, move |db| db.get_user_chirps(user, viewer_id, PAGE_SIZE, offset)).await?;

    debug!(user, offset, count = rows.len(), "Served chirp page");

    let posts: Vec<Post> = rows.into_iter().map(Post::from).collect();
    Ok(Json(posts))
}
