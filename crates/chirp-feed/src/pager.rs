use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::future::Future;

use chrono::Utc;
use tracing::{debug, error, info};

use chirp_types::models::Post;

use crate::config::FeedConfig;
use crate::cursor::{Blocked, FeedCursor, PageRequest};
use crate::error::FeedError;
use crate::relative_time::{self, TimestampSurface};
use crate::render::FeedItem;

/// Where pages come from.
pub trait FeedSource {
    fn fetch_page(&self, request: PageRequest) -> impl Future<Output = Result<Vec<Post>, FeedError>>;
}

/// Rendering side of the feed: the `#posts` container, its offset hook and
/// the loading indicator.
pub trait FeedView: TimestampSurface {
    fn show_loading(&self);
    fn hide_loading(&self);
    fn append_item(&self, item: &FeedItem);
    /// Mirror the cursor offset into the view (the `data-offset` hook).
    fn set_offset(&self, offset: u32);
    fn show_end_of_feed(&self);
}

/// Scroll position of the page, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub inner_height: f64,
    pub document_height: f64,
}

impl Viewport {
    pub fn at_bottom(&self) -> bool {
        self.scroll_y + self.inner_height >= self.document_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page fetched; the number of new items appended.
    Rendered(usize),
    /// Another fetch was in flight; this request was dropped.
    Suppressed,
    /// The feed already ended; nothing was requested.
    Exhausted,
    /// Fetch failed or timed out; the same page will be requested next time.
    Failed,
}

/// Loads a user's chirps page by page into a view.
///
/// All methods take `&self` and the pager is meant to live on one task: the
/// cursor is a `Cell`, and a request that finds it `Fetching` returns
/// straight away instead of waiting.
pub struct FeedPager<S, V> {
    source: S,
    view: V,
    user: i64,
    config: FeedConfig,
    cursor: Cell<FeedCursor>,
    rendered: RefCell<HashSet<i64>>,
}

impl<S: FeedSource, V: FeedView> FeedPager<S, V> {
    pub fn new(source: S, view: V, user: i64, config: FeedConfig) -> Self {
        Self {
            source,
            view,
            user,
            config,
            cursor: Cell::new(FeedCursor::new()),
            rendered: RefCell::new(HashSet::new()),
        }
    }

    pub fn cursor(&self) -> FeedCursor {
        self.cursor.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Initial load; same as a scroll to the bottom.
    pub async fn start(&self) -> PageOutcome {
        self.request_next_page().await
    }

    /// Scroll handler: loads the next page only when the viewport reached the
    /// bottom of the document.
    pub async fn on_scroll(&self, viewport: Viewport) -> Option<PageOutcome> {
        if !viewport.at_bottom() {
            return None;
        }
        Some(self.request_next_page().await)
    }

    pub async fn request_next_page(&self) -> PageOutcome {
        let mut cursor = self.cursor.get();
        let offset = match cursor.begin() {
            Ok(offset) => offset,
            Err(Blocked::InFlight) => {
                debug!(user = self.user, "Page fetch already in flight; dropping request");
                return PageOutcome::Suppressed;
            }
            Err(Blocked::Exhausted) => return PageOutcome::Exhausted,
        };
        self.cursor.set(cursor);

        // Resets the cursor and hides the indicator on every exit path,
        // including this future being dropped mid-fetch.
        let _release = FetchRelease { pager: self };
        self.view.show_loading();

        tokio::time::sleep(self.config.debounce).await;

        let request = PageRequest {
            user: self.user,
            offset,
        };
        let result = match tokio::time::timeout(self.config.request_timeout, self.source.fetch_page(request)).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::Timeout(self.config.request_timeout)),
        };

        let posts = match result {
            Ok(posts) => posts,
            Err(e) => {
                error!(user = self.user, offset, "Error fetching chirps: {}", e);
                return PageOutcome::Failed;
            }
        };

        let received = posts.len();
        let appended = self.render(&posts);

        let mut cursor = self.cursor.get();
        cursor.complete(received, self.config.page_size);
        self.cursor.set(cursor);

        self.view.set_offset(cursor.offset);
        relative_time::refresh_all(&self.view, Utc::now());

        if cursor.exhausted {
            info!(user = self.user, offset = cursor.offset, "Reached end of feed");
            self.view.show_end_of_feed();
        }

        PageOutcome::Rendered(appended)
    }

    /// Append posts not already on the page. Returns how many were appended.
    fn render(&self, posts: &[Post]) -> usize {
        let mut rendered = self.rendered.borrow_mut();
        let mut appended = 0;
        for post in posts {
            // Newer chirps shift offsets, so a page can repeat the tail of the
            // previous one.
            if !rendered.insert(post.id) {
                debug!(chirp_id = post.id, "Skipping chirp already on the page");
                continue;
            }
            self.view.append_item(&FeedItem::from_post(post));
            appended += 1;
        }
        appended
    }
}

struct FetchRelease<'a, S, V: FeedView> {
    pager: &'a FeedPager<S, V>,
}

impl<S, V: FeedView> Drop for FetchRelease<'_, S, V> {
    fn drop(&mut self) {
        let mut cursor = self.pager.cursor.get();
        if cursor.is_fetching() {
            cursor.fail();
            self.pager.cursor.set(cursor);
        }
        self.pager.view.hide_loading();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::FetchState;
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    fn post(id: i64) -> Post {
        Post {
            id,
            name: Some("Ada".into()),
            username: Some("ada".into()),
            profile_pic: None,
            is_verified: false,
            chirp: format!("chirp {id}"),
            timestamp: Utc::now().timestamp() - 30,
            reply_count: 0,
            rechirp_count: 0,
            like_count: 0,
            rechirped_by_current_user: false,
            liked_by_current_user: false,
        }
    }

    fn page(ids: std::ops::Range<i64>) -> Vec<Post> {
        ids.map(post).collect()
    }

    /// Replays scripted responses, each after `latency`.
    #[derive(Default)]
    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<Vec<Post>, FeedError>>>,
        requests: RefCell<Vec<PageRequest>>,
        latency: Duration,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<Post>, FeedError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                latency: Duration::from_millis(100),
                ..Default::default()
            }
        }

        fn offsets(&self) -> Vec<u32> {
            self.requests.borrow().iter().map(|r| r.offset).collect()
        }
    }

    impl FeedSource for ScriptedSource {
        async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Post>, FeedError> {
            self.requests.borrow_mut().push(request);
            tokio::time::sleep(self.latency).await;
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct RecordingView {
        items: RefCell<Vec<FeedItem>>,
        labels: RefCell<HashMap<i64, String>>,
        loading: Cell<bool>,
        loading_shown: Cell<usize>,
        offset: Cell<u32>,
        ended: Cell<bool>,
    }

    impl TimestampSurface for RecordingView {
        fn timestamps(&self) -> Vec<(i64, i64)> {
            self.items.borrow().iter().map(|i| (i.id, i.timestamp)).collect()
        }

        fn set_relative_time(&self, chirp_id: i64, label: &str) {
            self.labels.borrow_mut().insert(chirp_id, label.to_string());
        }
    }

    impl FeedView for RecordingView {
        fn show_loading(&self) {
            self.loading.set(true);
            self.loading_shown.set(self.loading_shown.get() + 1);
        }

        fn hide_loading(&self) {
            self.loading.set(false);
        }

        fn append_item(&self, item: &FeedItem) {
            self.items.borrow_mut().push(item.clone());
        }

        fn set_offset(&self, offset: u32) {
            self.offset.set(offset);
        }

        fn show_end_of_feed(&self) {
            self.ended.set(true);
        }
    }

    fn pager(source: ScriptedSource) -> FeedPager<ScriptedSource, RecordingView> {
        FeedPager::new(source, RecordingView::default(), 7, FeedConfig::default())
    }

    const BOTTOM: Viewport = Viewport {
        scroll_y: 1200.0,
        inner_height: 800.0,
        document_height: 2000.0,
    };

    #[tokio::test(start_paused = true)]
    async fn overlapping_requests_issue_one_fetch() {
        let pager = pager(ScriptedSource::new(vec![Ok(page(0..12))]));

        let (first, second, third) = tokio::join!(
            pager.start(),
            pager.on_scroll(BOTTOM),
            pager.request_next_page(),
        );

        assert_eq!(first, PageOutcome::Rendered(12));
        assert_eq!(second, Some(PageOutcome::Suppressed));
        assert_eq!(third, PageOutcome::Suppressed);
        assert_eq!(pager.source().offsets(), vec![0]);
        assert_eq!(pager.view().loading_shown.get(), 1);
        assert!(!pager.view().loading.get());
    }

    #[tokio::test(start_paused = true)]
    async fn offset_advances_by_page_size_and_is_mirrored() {
        let pager = pager(ScriptedSource::new(vec![Ok(page(0..12)), Ok(page(12..24))]));

        pager.start().await;
        pager.on_scroll(BOTTOM).await;

        assert_eq!(pager.source().offsets(), vec![0, 12]);
        assert_eq!(pager.cursor().offset, 24);
        assert_eq!(pager.view().offset.get(), 24);
        assert_eq!(pager.view().items.borrow().len(), 24);
        // Timestamps were labelled as part of the render.
        let labels = pager.view().labels.borrow();
        assert_eq!(labels.len(), 24);
        assert!(labels[&0].ends_with("s ago"), "unexpected label {}", labels[&0]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_page_still_advances_and_ends_feed() {
        let pager = pager(ScriptedSource::new(vec![Ok(Vec::new())]));

        assert_eq!(pager.start().await, PageOutcome::Rendered(0));
        assert_eq!(pager.cursor().offset, 12);
        assert!(pager.cursor().exhausted);
        assert!(pager.view().ended.get());

        assert_eq!(pager.on_scroll(BOTTOM).await, Some(PageOutcome::Exhausted));
        assert_eq!(pager.source().offsets(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_offset_and_releases_cursor() {
        let pager = pager(ScriptedSource::new(vec![
            Ok(page(0..12)),
            Err(FeedError::Status(500)),
            Ok(page(12..20)),
        ]));

        pager.start().await;
        assert_eq!(pager.request_next_page().await, PageOutcome::Failed);
        assert_eq!(pager.cursor().offset, 12);
        assert_eq!(pager.cursor().state, FetchState::Idle);
        assert!(!pager.view().loading.get());
        assert_eq!(pager.view().offset.get(), 12);

        // Retry requests the same page.
        assert_eq!(pager.request_next_page().await, PageOutcome::Rendered(8));
        assert_eq!(pager.source().offsets(), vec![0, 12, 12]);
        assert_eq!(pager.cursor().offset, 24);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_fetch_times_out() {
        let mut source = ScriptedSource::new(vec![Ok(page(0..12)), Ok(page(0..12))]);
        source.latency = Duration::from_secs(60);
        let pager = pager(source);

        assert_eq!(pager.start().await, PageOutcome::Failed);
        assert_eq!(pager.cursor().state, FetchState::Idle);
        assert_eq!(pager.cursor().offset, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_fetch_releases_cursor() {
        let pager = pager(ScriptedSource::new(vec![Ok(page(0..12))]));

        let abandoned = tokio::time::timeout(Duration::from_millis(200), pager.start()).await;
        assert!(abandoned.is_err());
        assert_eq!(pager.cursor().state, FetchState::Idle);
        assert!(!pager.view().loading.get());
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_above_bottom_does_nothing() {
        let pager = pager(ScriptedSource::new(vec![]));
        let mid_page = Viewport {
            scroll_y: 100.0,
            ..BOTTOM
        };

        assert_eq!(pager.on_scroll(mid_page).await, None);
        assert!(pager.source().offsets().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_chirps_are_not_rendered_twice() {
        let pager = pager(ScriptedSource::new(vec![Ok(page(0..12)), Ok(page(10..22))]));

        pager.start().await;
        assert_eq!(pager.request_next_page().await, PageOutcome::Rendered(10));
        assert_eq!(pager.view().items.borrow().len(), 22);
        assert_eq!(pager.cursor().offset, 24);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_author_fields_render_fallbacks() {
        let mut bare = post(1);
        bare.name = None;
        bare.username = None;
        let pager = pager(ScriptedSource::new(vec![Ok(vec![bare])]));

        pager.start().await;

        let items = pager.view().items.borrow();
        assert_eq!(items[0].display_name, "Guest");
        assert_eq!(items[0].username, "guest");
    }
}
