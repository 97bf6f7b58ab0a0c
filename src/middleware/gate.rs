use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use time::{Duration, OffsetDateTime};

use super::config::AuthSettings;
use super::cookies;
use super::extractor::SessionUser;
use crate::paths::PathRules;
use crate::session::{Session, SessionCodec};

/// Result of running the gate on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Let the request through, with the session if one was verified.
    Proceed(Option<Session>),
    /// Send the client to the given path instead.
    Redirect(String),
}

/// Per-request session check.
///
/// Holds no per-request state: the decision depends only on the request
/// path and its own cookie.
#[derive(Debug, Clone)]
pub struct Gate {
    codec: Arc<SessionCodec>,
    paths: Arc<PathRules>,
    login_path: Arc<str>,
    update_age: Duration,
    secure_cookies: bool,
}

impl Gate {
    pub(super) fn new(codec: Arc<SessionCodec>, settings: &AuthSettings) -> Self {
        Self {
            codec,
            paths: Arc::new(settings.effective_paths()),
            login_path: Arc::from(settings.login_path.as_str()),
            update_age: settings.session_update_age,
            secure_cookies: settings.secure_cookies,
        }
    }

    /// Decide what happens to a request for `path` carrying `token`.
    ///
    /// Static assets proceed without looking at the cookie. Otherwise a
    /// verified session proceeds on any path, and anything else proceeds
    /// only on public paths.
    #[must_use]
    pub fn evaluate(&self, path: &str, token: Option<&str>, now: OffsetDateTime) -> GateOutcome {
        if self.paths.is_static_asset(path) {
            return GateOutcome::Proceed(None);
        }

        if let Some(session) = token.and_then(|t| self.codec.decode_at(t, now)) {
            return GateOutcome::Proceed(Some(session));
        }

        if self.paths.is_public(path) {
            GateOutcome::Proceed(None)
        } else {
            GateOutcome::Redirect(self.login_path.to_string())
        }
    }
}

/// Axum middleware applying the [`Gate`] to every request.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/", get(home))
///     .merge(auth_routes(config.clone(), client))
///     .layer(axum::middleware::from_fn_with_state(config.gate(), require_session));
/// ```
///
/// A verified session is attached to the request as [`SessionUser`]. When the
/// token is older than the update age, the cookie is re-issued on the response.
pub async fn require_session(
    State(gate): State<Gate>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let now = OffsetDateTime::now_utc();
    let token = cookies::session_token(&jar);

    let outcome = gate.evaluate(request.uri().path(), token.as_deref(), now);
    match outcome {
        GateOutcome::Proceed(None) => next.run(request).await,
        GateOutcome::Proceed(Some(session)) => {
            let refreshed = if session.needs_refresh(now, gate.update_age) {
                refresh_cookie(&gate, &session, now)
            } else {
                None
            };

            request.extensions_mut().insert(SessionUser::from(session));
            let mut response = next.run(request).await;

            if let Some(cookie) = refreshed {
                // Never override a handler that set or cleared the cookie itself.
                let handler_set_cookie = response
                    .headers()
                    .get_all(SET_COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .any(cookies::sets_session_cookie);
                if !handler_set_cookie {
                    response.headers_mut().append(SET_COOKIE, cookie);
                }
            }
            response
        }
        GateOutcome::Redirect(to) => {
            tracing::debug!(path = %request.uri().path(), redirect = %to, "No session, redirecting");
            Redirect::temporary(&to).into_response()
        }
    }
}

fn refresh_cookie(gate: &Gate, session: &Session, now: OffsetDateTime) -> Option<HeaderValue> {
    let token = gate
        .codec
        .encode_at(&session.identity, now)
        .inspect_err(|e| tracing::warn!(error = %e, "Session refresh failed"))
        .ok()?;
    let cookie = cookies::session_cookie(&token, gate.secure_cookies);
    HeaderValue::from_str(&cookie.to_string()).ok()
}
