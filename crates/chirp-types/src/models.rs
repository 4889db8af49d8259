use serde::{Deserialize, Deserializer, Serialize};

/// A chirp as served by the paged feed endpoint.
///
/// Author fields are optional on the wire: rows whose author was deleted, or
/// older rows imported without profile data, come through as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, rename = "profilePic")]
    pub profile_pic: Option<String>,
    #[serde(default, rename = "isVerified", deserialize_with = "lenient_flag")]
    pub is_verified: bool,
    pub chirp: String,
    /// Unix epoch seconds.
    pub timestamp: i64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub rechirp_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub rechirped_by_current_user: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub liked_by_current_user: bool,
}

/// Profile header data for the user page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: Option<String>,
    pub username: String,
    pub bio: Option<String>,
    #[serde(rename = "profilePic")]
    pub profile_pic: Option<String>,
    #[serde(rename = "userBanner")]
    pub user_banner: Option<String>,
    pub following: Option<u64>,
    pub followers: Option<u64>,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
}

/// SQLite hands booleans back as 0/1, and some producers forward that as-is.
/// Accept bool, integer or null.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        None => false,
    })
}
