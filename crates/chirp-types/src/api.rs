use std::fmt;

use serde::{Deserialize, Serialize};

// -- Session claims --

/// JWT claims carried by the session token. Shared by chirp-api (decoding)
/// and any tooling that mints tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    pub exp: usize,
}

// -- Feed --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchChirpsQuery {
    #[serde(default)]
    pub offset: i64,
    pub user: i64,
}

// -- Interactions --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractAction {
    Like,
    Rechirp,
}

impl InteractAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Rechirp => "rechirp",
        }
    }
}

impl fmt::Display for InteractAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractRequest {
    #[serde(rename = "chirpId")]
    pub chirp_id: i64,
    pub action: InteractAction,
}

/// Error code returned when a guest tries to interact.
pub const NOT_SIGNED_IN: &str = "not_signed_in";
/// Error code returned when the chirp id does not exist.
pub const CHIRP_NOT_FOUND: &str = "chirp_not_found";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rechirped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rechirp_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InteractResponse {
    /// Successful toggle of `action`, reporting the new state and count.
    pub fn toggled(action: InteractAction, active: bool, count: u64) -> Self {
        match action {
            InteractAction::Like => Self {
                success: true,
                liked: Some(active),
                like_count: Some(count),
                ..Default::default()
            },
            InteractAction::Rechirp => Self {
                success: true,
                rechirped: Some(active),
                rechirp_count: Some(count),
                ..Default::default()
            },
        }
    }

    pub fn failure(code: &str) -> Self {
        Self {
            success: false,
            error: Some(code.to_string()),
            ..Default::default()
        }
    }

    /// State and count for `action`, if the server reported them.
    pub fn state_for(&self, action: InteractAction) -> (Option<bool>, Option<u64>) {
        match action {
            InteractAction::Like => (self.liked, self.like_count),
            InteractAction::Rechirp => (self.rechirped, self.rechirp_count),
        }
    }

    pub fn is_not_signed_in(&self) -> bool {
        !self.success && self.error.as_deref() == Some(NOT_SIGNED_IN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_chirp_id() {
        let req = InteractRequest {
            chirp_id: 42,
            action: InteractAction::Rechirp,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"chirpId":42,"action":"rechirp"}"#);
    }

    #[test]
    fn toggled_only_sets_matching_action() {
        let resp = InteractResponse::toggled(InteractAction::Like, true, 5);
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":true,"liked":true,"like_count":5}"#);
        assert_eq!(resp.state_for(InteractAction::Rechirp), (None, None));
    }

    #[test]
    fn not_signed_in_detection() {
        let resp: InteractResponse =
            serde_json::from_str(r#"{"success":false,"error":"not_signed_in"}"#).unwrap();
        assert!(resp.is_not_signed_in());
        assert!(!InteractResponse::failure(CHIRP_NOT_FOUND).is_not_signed_in());
    }
}
