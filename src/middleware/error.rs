use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use super::config::DEFAULT_LOGIN_PATH;

/// Authentication errors for the middleware layer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session found.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Login attempt failed (bad input, rejected credentials, backend trouble).
    ///
    /// As a response this redirects to the default `/login` page. It has no
    /// access to [`AuthConfig`](super::AuthConfig), so a custom
    /// `with_login_path` is not seen here; the auth routes build their own
    /// redirect from the configured path instead of returning this variant.
    #[error(transparent)]
    Authentication(#[from] crate::error::Error),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()).into_response(),
            Self::Authentication(ref err) => {
                let encoded = urlencoding::encode(&err.public_message()).into_owned();
                Redirect::to(&format!("{DEFAULT_LOGIN_PATH}?error={encoded}")).into_response()
            }
            Self::Config(_) => {
                tracing::error!(error = %self, "Auth internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}
