use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use tracing::info;

use chirp_types::api::{CHIRP_NOT_FOUND, InteractRequest, InteractResponse, NOT_SIGNED_IN};

use crate::error::ApiError;
use crate::session::Viewer;
use crate::state::{AppState, run_db};

/// POST /interact_chirp toggles a like or rechirp for the signed-in viewer.
///
/// Guests and unknown chirps get a `success: false` body with status 200 so
/// the page can branch on `error`. A store failure is a 500, and the viewer
/// also gets a deferred error shown on their next page load.
pub async fn interact_chirp(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(req): Json<InteractRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(claims) = viewer.claims() else {
        return Ok(Json(InteractResponse::failure(NOT_SIGNED_IN)));
    };

    let user_id = claims.sub;
    let InteractRequest { chirp_id, action } = req;

    let result = run_db(&state, move |db| {
        if !db.chirp_exists(chirp_id)? {
            return Ok(None);
        }
        db.toggle_interaction(action, chirp_id, user_id).map(Some)
    })
    .await;

    match result {
        Ok(Some(outcome)) => {
            info!(
                chirp_id,
                user_id,
                %action,
                active = outcome.active,
                count = outcome.count,
                "Interaction toggled"
            );
            Ok(Json(InteractResponse::toggled(
                action,
                outcome.active,
                outcome.count.max(0) as u64,
            )))
        }
        Ok(None) => Ok(Json(InteractResponse::failure(CHIRP_NOT_FOUND))),
        Err(e) => {
            state
                .flash
                .push(user_id, format!("Could not {} chirp {}. Please try again.", action, chirp_id));
            Err(e)
        }
    }
}
