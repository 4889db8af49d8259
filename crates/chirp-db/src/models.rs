//! Database row types. These map directly to SQLite rows and stay
//! independent of the chirp-types wire models.

use chirp_types::models::{Post, UserProfile};

/// Fields needed to insert a user. Everything but the username is optional.
#[derive(Debug, Default)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub profile_pic: Option<&'a str>,
    pub user_banner: Option<&'a str>,
    pub is_verified: bool,
}

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
    pub user_banner: Option<String>,
    pub following: Option<i64>,
    pub followers: Option<i64>,
    pub is_verified: bool,
}

/// One feed entry: the chirp joined with its author and aggregate counts.
/// Author columns are nullable because the join is a LEFT JOIN.
pub struct ChirpRow {
    pub id: i64,
    pub author_name: Option<String>,
    pub author_username: Option<String>,
    pub author_profile_pic: Option<String>,
    pub author_verified: bool,
    pub chirp: String,
    pub timestamp: i64,
    pub reply_count: i64,
    pub rechirp_count: i64,
    pub like_count: i64,
    pub liked_by_viewer: bool,
    pub rechirped_by_viewer: bool,
}

/// Result of a like/rechirp toggle, read back inside the same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub active: bool,
    pub count: i64,
}

fn count(n: i64) -> u64 {
    n.max(0) as u64
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            username: row.username,
            bio: row.bio,
            profile_pic: row.profile_pic,
            user_banner: row.user_banner,
            following: row.following.map(count),
            followers: row.followers.map(count),
            is_verified: row.is_verified,
        }
    }
}

impl From<ChirpRow> for Post {
    fn from(row: ChirpRow) -> Self {
        Self {
            id: row.id,
            name: row.author_name,
            username: row.author_username,
            profile_pic: row.author_profile_pic,
            is_verified: row.author_verified,
            chirp: row.chirp,
            timestamp: row.timestamp,
            reply_count: count(row.reply_count),
            rechirp_count: count(row.rechirp_count),
            like_count: count(row.like_count),
            rechirped_by_current_user: row.rechirped_by_viewer,
            liked_by_current_user: row.liked_by_viewer,
        }
    }
}
