use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::error;

use chirp_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub flash: FlashStore,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: impl Into<String>) -> AppState {
        Arc::new(Self {
            db,
            jwt_secret: jwt_secret.into(),
            flash: FlashStore::default(),
        })
    }
}

/// Run a blocking DB closure off the async runtime.
pub async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
        .map_err(ApiError::Internal)
}

/// One-shot error messages queued for a signed-in viewer. A message is
/// surfaced on that viewer's next page render and removed as it is read.
#[derive(Default)]
pub struct FlashStore {
    messages: Mutex<HashMap<i64, String>>,
}

impl FlashStore {
    /// Queue a message, replacing any undelivered one for the same user.
    pub fn push(&self, user_id: i64, message: impl Into<String>) {
        match self.messages.lock() {
            Ok(mut messages) => {
                messages.insert(user_id, message.into());
            }
            Err(e) => error!("Flash store lock poisoned: {}", e),
        }
    }

    pub fn take(&self, user_id: i64) -> Option<String> {
        match self.messages.lock() {
            Ok(mut messages) => messages.remove(&user_id),
            Err(e) => {
                error!("Flash store lock poisoned: {}", e);
                None
            }
        }
    }
}
