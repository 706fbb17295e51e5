use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;

use super::error::ApiError;
use crate::state::AppState;

/// The caller's identity, resolved from a session cookie or bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn token_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .and_then(|cookie| non_empty(cookie.value()))
}

fn token_from_authorization(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    non_empty(token)
}

pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    token_from_cookies(headers, cookie_name).or_else(|| token_from_authorization(headers))
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.session_cookie_name)
            .ok_or(ApiError::Unauthenticated)?;

        match state.db.find_session_user(&token).await {
            Ok(Some(user_id)) => Ok(AuthenticatedUser { user_id }),
            Ok(None) => Err(ApiError::Unauthenticated),
            Err(err) => Err(ApiError::Internal(err)),
        }
    }
}
