use chirp_types::api::InteractAction;
use chirp_types::models::Post;

use crate::emoji::expand_shortcodes;

pub const GUEST_AVATAR: &str = "/src/images/users/guest/user.svg";
pub const GUEST_NAME: &str = "Guest";
pub const GUEST_USERNAME: &str = "guest";

/// Icon for an action button in the given state.
pub fn action_icon(action: InteractAction, active: bool) -> &'static str {
    match (action, active) {
        (InteractAction::Like, false) => "/src/images/icons/like.svg",
        (InteractAction::Like, true) => "/src/images/icons/liked.svg",
        (InteractAction::Rechirp, false) => "/src/images/icons/rechirp.svg",
        (InteractAction::Rechirp, true) => "/src/images/icons/rechirped.svg",
    }
}

/// Display-ready form of a [`Post`]: fallbacks applied, emoji expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: i64,
    pub display_name: String,
    pub username: String,
    pub avatar: String,
    pub verified: bool,
    pub body: String,
    /// Unix epoch seconds; the relative label is derived from it on each tick.
    pub timestamp: i64,
    pub permalink: String,
    pub reply_count: u64,
    pub rechirp_count: u64,
    pub like_count: u64,
    pub rechirped: bool,
    pub liked: bool,
}

impl FeedItem {
    pub fn from_post(post: &Post) -> Self {
        let display_name = post
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(expand_shortcodes)
            .unwrap_or_else(|| GUEST_NAME.to_string());
        let username = post
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(GUEST_USERNAME)
            .to_string();
        let avatar = post
            .profile_pic
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(GUEST_AVATAR)
            .to_string();

        Self {
            id: post.id,
            display_name,
            username,
            avatar,
            verified: post.is_verified,
            body: expand_shortcodes(&post.chirp),
            timestamp: post.timestamp,
            permalink: format!("/chirp/?id={}", post.id),
            reply_count: post.reply_count,
            rechirp_count: post.rechirp_count,
            like_count: post.like_count,
            rechirped: post.rechirped_by_current_user,
            liked: post.liked_by_current_user,
        }
    }

    pub fn is_active(&self, action: InteractAction) -> bool {
        match action {
            InteractAction::Like => self.liked,
            InteractAction::Rechirp => self.rechirped,
        }
    }

    pub fn count(&self, action: InteractAction) -> u64 {
        match action {
            InteractAction::Like => self.like_count,
            InteractAction::Rechirp => self.rechirp_count,
        }
    }

    pub fn icon(&self, action: InteractAction) -> &'static str {
        action_icon(action, self.is_active(action))
    }

    /// Apply server-reported state for one action. `None` leaves that part
    /// as it was.
    pub fn apply(&mut self, action: InteractAction, active: Option<bool>, count: Option<u64>) {
        let (flag, total) = match action {
            InteractAction::Like => (&mut self.liked, &mut self.like_count),
            InteractAction::Rechirp => (&mut self.rechirped, &mut self.rechirp_count),
        };
        if let Some(active) = active {
            *flag = active;
        }
        if let Some(count) = count {
            *total = count;
        }
    }
}
