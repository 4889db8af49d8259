pub mod api;
pub mod models;

/// Number of chirps served per feed page. Client offsets advance by exactly this much.
pub const PAGE_SIZE: u32 = 12;
