//! Client core for the Chirp profile feed.
//!
//! [`FeedPager`] pages a user's chirps into a [`FeedView`] with at most one
//! request in flight, [`InteractionClient`] toggles likes and rechirps, and
//! [`relative_time`] keeps "5m ago" labels current. Rendering goes through the
//! view/button/navigator traits so the core runs without a DOM.

pub mod config;
pub mod cursor;
pub mod emoji;
pub mod error;
pub mod http;
pub mod interaction;
pub mod pager;
pub mod relative_time;
pub mod render;

pub use config::FeedConfig;
pub use cursor::{FeedCursor, FetchState, PageRequest};
pub use error::FeedError;
pub use interaction::{InteractionClient, InteractionOutcome};
pub use pager::{FeedPager, FeedSource, FeedView, PageOutcome, Viewport};
pub use render::FeedItem;
