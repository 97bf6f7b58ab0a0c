use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use time::OffsetDateTime;

use super::error::AuthError;
use crate::session::Session;
use crate::types::Identity;

/// Signed-in user, as verified by [`require_session`](super::require_session).
///
/// Use as an Axum extractor in route handlers behind the gate. Returns
/// `401 Unauthorized` if the gate did not attach a session.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(user: SessionUser) -> impl IntoResponse {
///     format!("Orders for {} ({})", user.identity.name, user.identity.role)
/// }
///
/// // Optional: accessible to both signed-in and anonymous users
/// async fn landing(user: Option<SessionUser>) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}", u.identity.name),
///         None => "Hello, guest".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub identity: Identity,
    pub expires_at: OffsetDateTime,
}

impl From<Session> for SessionUser {
    fn from(session: Session) -> Self {
        Self {
            identity: session.identity,
            expires_at: session.expires_at,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SessionUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for SessionUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<SessionUser>().cloned())
    }
}
