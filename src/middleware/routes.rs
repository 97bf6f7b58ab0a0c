use std::sync::Arc;

use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::config::AuthConfig;
use super::cookies;
use super::state::AuthState;
use super::traits::Authenticator;
use super::types::SessionView;
use crate::credentials::Credentials;
use crate::error::Error;

/// Create the storefront authentication router.
///
/// Mounts, under the configured auth path (default `/api/auth`):
/// - `POST /callback/credentials`: form login
/// - `GET /session`: current session as JSON (`{}` when signed out)
/// - `GET|POST /signout`: clear the session cookie
pub fn auth_routes<A>(config: AuthConfig, authenticator: A) -> Router
where
    A: Authenticator,
{
    let auth_path = config.settings.auth_path.trim_end_matches('/').to_string();

    let state = AuthState {
        authenticator: Arc::new(authenticator),
        codec: config.codec,
        settings: config.settings,
    };

    Router::new()
        .route(
            &format!("{auth_path}/callback/credentials"),
            post(sign_in::<A>),
        )
        .route(&format!("{auth_path}/session"), get(session::<A>))
        .route(
            &format!("{auth_path}/signout"),
            get(sign_out::<A>).post(sign_out::<A>),
        )
        .with_state(state)
}

// ── Sign in ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SignInForm {
    email: Option<String>,
    password: Option<String>,
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

async fn sign_in<A: Authenticator>(
    State(state): State<AuthState<A>>,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Result<(CookieJar, Redirect), Response> {
    let credentials = Credentials::from_parts(form.email, form.password).map_err(|e| {
        tracing::debug!(error = %e, "Sign-in form incomplete");
        login_error(&state.settings.login_path, &e)
    })?;

    let identity = state
        .authenticator
        .authenticate(&credentials)
        .await
        .map_err(|e| login_error(&state.settings.login_path, &e))?;

    let token = state.codec.encode(&identity).map_err(|e| {
        tracing::error!(error = %e, "Session token creation failed");
        login_error(&state.settings.login_path, &e)
    })?;

    let session_cookie = cookies::session_cookie(&token, state.settings.secure_cookies);

    tracing::info!(user_id = %identity.id, role = %identity.role, "Credentials login successful");

    let target = safe_callback(form.callback_url.as_deref())
        .unwrap_or(&state.settings.login_redirect)
        .to_string();

    Ok((jar.add(session_cookie), Redirect::to(&target)))
}

// ── Session ────────────────────────────────────────────────────────

async fn session<A: Authenticator>(State(state): State<AuthState<A>>, jar: CookieJar) -> Response {
    match cookies::session_token(&jar).and_then(|t| state.codec.decode(&t)) {
        Some(session) => Json(SessionView::from(&session)).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    }
}

// ── Sign out ───────────────────────────────────────────────────────

async fn sign_out<A: Authenticator>(
    State(state): State<AuthState<A>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(session) = cookies::session_token(&jar).and_then(|t| state.codec.decode(&t)) {
        tracing::info!(user_id = %session.identity.id, "Signed out");
    }

    let clear_cookie = cookies::clear_session_cookie();
    (jar.remove(clear_cookie), Redirect::to(&state.settings.logout_redirect))
}

// ── Helpers ────────────────────────────────────────────────────────

fn login_error(login_path: &str, err: &Error) -> Response {
    let encoded = urlencoding::encode(&err.public_message()).into_owned();
    Redirect::to(&format!("{login_path}?error={encoded}")).into_response()
}

/// Accept only same-site relative paths as post-login targets.
fn safe_callback(callback: Option<&str>) -> Option<&str> {
    callback.filter(|c| c.starts_with('/') && !c.starts_with("//") && !c.starts_with("/\\"))
}
