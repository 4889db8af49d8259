use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use chirp_types::api::Claims;

use crate::state::AppState;

/// Cookie holding the session token issued at sign-in.
pub const SESSION_COOKIE: &str = "chirp_session";

/// Who is looking at the page. Inserted into request extensions by
/// [`attach_session`] for every page and API route.
#[derive(Debug, Clone, PartialEq)]
pub enum Viewer {
    Guest,
    SignedIn(Claims),
}

impl Viewer {
    pub fn id(&self) -> Option<i64> {
        self.claims().map(|c| c.sub)
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Self::Guest => None,
            Self::SignedIn(claims) => Some(claims),
        }
    }
}

/// Resolve the viewer from the session cookie or a bearer token. A missing,
/// expired or forged token makes the request a guest request rather than
/// failing it; the profile page is public.
pub async fn attach_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = bearer_token(&req).or_else(|| {
        CookieJar::from_headers(req.headers())
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    });

    let viewer = match token {
        Some(token) => match decode_token(&state.jwt_secret, &token) {
            Ok(claims) => Viewer::SignedIn(claims),
            Err(e) => {
                debug!("Ignoring invalid session token: {}", e);
                Viewer::Guest
            }
        },
        None => Viewer::Guest,
    };

    req.extensions_mut().insert(viewer);
    next.run(req).await
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

pub fn decode_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Mint a 30-day session token. Sign-in lives elsewhere; this is for tooling
/// that needs to act as a user.
pub fn issue_token(secret: &str, user_id: i64, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        name: None,
        profile_pic: None,
        is_verified: false,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    issue_token_for(secret, &claims)
}

pub fn issue_token_for(secret: &str, claims: &Claims) -> anyhow::Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let token = issue_token("secret", 9, "ada").unwrap();
        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.sub, 9);
        assert_eq!(claims.username, "ada");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", 9, "ada").unwrap();
        assert!(decode_token("other", &token).is_err());
    }

    #[test]
    fn guest_has_no_id() {
        assert_eq!(Viewer::Guest.id(), None);
    }
}
