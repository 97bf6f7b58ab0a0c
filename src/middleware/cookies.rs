use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::config::SESSION_COOKIE_NAME;
use crate::session::SESSION_MAX_AGE;

/// Create session cookie.
pub(super) fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(SESSION_MAX_AGE)
        .build()
}

/// Create removal cookie for session.
pub(super) fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Get the session token from cookies.
pub(super) fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Whether a `Set-Cookie` header value targets the session cookie.
pub(super) fn sets_session_cookie(header: &str) -> bool {
    header
        .split_once('=')
        .is_some_and(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
}
