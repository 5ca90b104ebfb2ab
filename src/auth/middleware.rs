//! Authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::state::AppState;

/// Cookie carrying the percent-encoded display name
pub const USER_COOKIE_NAME: &str = "milim_user";

/// Cookie carrying the in-memory drill session id
pub const SESSION_COOKIE_NAME: &str = "milim_session";

/// Derive the storage key from a display name: trimmed, whitespace runs
/// collapsed to underscores. Hebrew names pass through unchanged.
pub fn user_id_from_name(name: &str) -> String {
    name.trim().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Authenticated request context.
/// Add this as a handler parameter to require sign-in.
/// Redirects to /login when the cookie is missing or unreadable.
#[derive(Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub display_name: String,
    /// Key into the in-memory drill session store
    pub session_id: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/login").into_response())?;

        let encoded_name = jar
            .get(USER_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .ok_or_else(|| Redirect::to("/login").into_response())?;

        let display_name = urlencoding::decode(&encoded_name)
            .map(|name| name.into_owned())
            .map_err(|_| Redirect::to("/login").into_response())?;

        let user_id = user_id_from_name(&display_name);
        if user_id.is_empty() {
            return Err(Redirect::to("/login").into_response());
        }

        let session_id = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .ok_or_else(|| Redirect::to("/login").into_response())?;

        Ok(AuthContext {
            user_id,
            display_name,
            session_id,
        })
    }
}

/// Optional authentication extractor.
/// Returns Some(AuthContext) if signed in, None otherwise.
/// Use for pages that work both with and without sign-in.
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthContext::from_request_parts(parts, state).await {
            Ok(auth) => Ok(OptionalAuth(Some(auth))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_name() {
        assert_eq!(user_id_from_name("Dana Levi"), "Dana_Levi");
        assert_eq!(user_id_from_name("  דנה   לוי  "), "דנה_לוי");
        assert_eq!(user_id_from_name("solo"), "solo");
        assert_eq!(user_id_from_name("   "), "");
    }
}
