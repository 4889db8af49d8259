use std::time::Duration;

use chirp_types::PAGE_SIZE;

/// Timing and sizing knobs for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Offset step after each successful page. Must match the server.
    pub page_size: u32,
    /// Pause between claiming the cursor and sending the request. Absorbs
    /// bursts of scroll events.
    pub debounce: Duration,
    /// Upper bound for a page fetch or interaction request.
    pub request_timeout: Duration,
    /// Cadence of the relative timestamp refresh.
    pub tick_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            debounce: Duration::from_millis(450),
            request_timeout: Duration::from_secs(10),
            tick_interval: Duration::from_secs(1),
        }
    }
}
