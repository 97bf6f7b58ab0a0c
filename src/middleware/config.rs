use std::sync::Arc;

use time::Duration;
use url::Url;

use super::error::AuthError;
use super::gate::Gate;
use crate::credentials::{CredentialsClient, CredentialsConfig};
use crate::paths::PathRules;
use crate::session::{SessionCodec, SessionKey};

/// Name of the session cookie.
///
/// The sign-in route, the gate and sign-out all read it from here.
pub const SESSION_COOKIE_NAME: &str = "next-auth.session-token-website";

/// Login page used unless [`AuthConfig::with_login_path`] overrides it.
pub(crate) const DEFAULT_LOGIN_PATH: &str = "/login";

/// Shared auth settings used by both config and runtime state.
#[derive(Debug, Clone)]
pub(crate) struct AuthSettings {
    pub(crate) session_update_age: Duration,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) login_path: String,
    pub(crate) login_redirect: String,
    pub(crate) logout_redirect: String,
    pub(crate) paths: PathRules,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            session_update_age: Duration::hours(24),
            secure_cookies: true,
            auth_path: "/api/auth".into(),
            login_path: DEFAULT_LOGIN_PATH.into(),
            login_redirect: "/".into(),
            logout_redirect: DEFAULT_LOGIN_PATH.into(),
            paths: PathRules::default(),
        }
    }

    /// Path rules with the auth and login paths always public.
    pub(crate) fn effective_paths(&self) -> PathRules {
        self.paths
            .clone()
            .with_public_prefix(self.auth_path.clone())
            .with_public_prefix(self.login_path.clone())
    }
}

/// Storefront authentication configuration.
///
/// Required fields (session secret, backend) are constructor parameters.
///
/// Use [`from_env()`](AuthConfig::from_env) for convention-based setup,
/// or [`new()`](AuthConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub(super) codec: Arc<SessionCodec>,
    pub(super) credentials: CredentialsConfig,
    pub(super) settings: AuthSettings,
}

impl AuthConfig {
    /// Create config from the session secret and the backend configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the secret is empty.
    pub fn new(secret: &str, credentials: CredentialsConfig) -> Result<Self, AuthError> {
        let key = SessionKey::derive(secret)
            .map_err(|_| AuthError::Config("session secret must not be empty".into()))?;
        Ok(Self {
            codec: Arc::new(SessionCodec::new(key)),
            credentials,
            settings: AuthSettings::defaults(),
        })
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `AUTH_SECRET`: session signing secret
    /// - `BACKEND_API_URL`: backend base URL (must be a valid URL)
    ///
    /// # Optional env vars
    /// - `DEV_AUTH`: Set to `"1"` or `"true"` to disable secure cookies
    /// - `SESSION_UPDATE_AGE_HOURS`: how old a token gets before the gate re-issues it
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if required env vars are missing or invalid.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env()`](AuthConfig::from_env) with a custom variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if required variables are missing or invalid.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let secret = lookup("AUTH_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AuthError::Config("AUTH_SECRET is required".into()))?;
        let backend_str = lookup("BACKEND_API_URL")
            .ok_or_else(|| AuthError::Config("BACKEND_API_URL is required".into()))?;
        let backend: Url = backend_str
            .parse()
            .map_err(|e| AuthError::Config(format!("BACKEND_API_URL: {e}")))?;

        let dev_auth = matches!(lookup("DEV_AUTH").as_deref(), Some("1") | Some("true"));

        let mut config =
            Self::new(&secret, CredentialsConfig::new(backend))?.with_secure_cookies(!dev_auth);

        if let Some(hours) = lookup("SESSION_UPDATE_AGE_HOURS") {
            let hours: i64 = hours
                .trim()
                .parse()
                .map_err(|e| AuthError::Config(format!("SESSION_UPDATE_AGE_HOURS: {e}")))?;
            if hours <= 0 {
                return Err(AuthError::Config(
                    "SESSION_UPDATE_AGE_HOURS must be positive".into(),
                ));
            }
            config = config.with_session_update_age(Duration::hours(hours));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_session_update_age(mut self, age: Duration) -> Self {
        self.settings.session_update_age = age;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.settings.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.login_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.logout_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_path_rules(mut self, rules: PathRules) -> Self {
        self.settings.paths = rules;
        self
    }

    /// Session codec shared by the routes and the gate.
    #[must_use]
    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Backend client built from this configuration.
    #[must_use]
    pub fn credentials_client(&self) -> CredentialsClient {
        CredentialsClient::new(self.credentials.clone())
    }

    /// Request gate built from this configuration.
    #[must_use]
    pub fn gate(&self) -> Gate {
        Gate::new(self.codec.clone(), &self.settings)
    }
}
