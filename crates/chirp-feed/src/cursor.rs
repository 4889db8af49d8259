/// Whether a page fetch is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching,
}

/// Why a page request did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    InFlight,
    Exhausted,
}

/// One page of a user's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub user: i64,
    pub offset: u32,
}

/// Paging position for one feed session. Starts at offset 0, only moves
/// forward, and is only written by the pager that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub offset: u32,
    pub state: FetchState,
    /// Set once the server returned a short page.
    pub exhausted: bool,
}

impl Default for FeedCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedCursor {
    pub fn new() -> Self {
        Self {
            offset: 0,
            state: FetchState::Idle,
            exhausted: false,
        }
    }

    /// Claim the cursor for a fetch. Returns the offset to request.
    pub fn begin(&mut self) -> Result<u32, Blocked> {
        if self.state == FetchState::Fetching {
            return Err(Blocked::InFlight);
        }
        if self.exhausted {
            return Err(Blocked::Exhausted);
        }
        self.state = FetchState::Fetching;
        Ok(self.offset)
    }

    /// Record a successful page of `received` items. The offset moves by a
    /// full page whatever the item count.
    pub fn complete(&mut self, received: usize, page_size: u32) {
        self.offset = self.offset.saturating_add(page_size);
        self.exhausted = received < page_size as usize;
        self.state = FetchState::Idle;
    }

    /// Release the cursor after a failed or abandoned fetch. Offset is kept so
    /// the same page is requested again next time.
    pub fn fail(&mut self) {
        self.state = FetchState::Idle;
    }

    pub fn is_fetching(&self) -> bool {
        self.state == FetchState::Fetching
    }
}
