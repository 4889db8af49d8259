pub mod chirps;
pub mod error;
pub mod interactions;
pub mod page;
pub mod profile;
pub mod routes;
pub mod session;
pub mod state;

pub use routes::router;
pub use state::{AppState, AppStateInner};
