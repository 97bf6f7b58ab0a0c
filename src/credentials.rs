use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, GENERIC_SIGNIN_FAILURE};
use crate::types::{AccessToken, Identity, Role, UserId};

const DEFAULT_SIGNIN_PATH: &str = "user/signin";

/// Backend identity endpoint configuration.
///
/// ```rust,ignore
/// use storefront_auth::CredentialsConfig;
///
/// let config = CredentialsConfig::new("https://api.example.com/v1".parse()?);
/// assert_eq!(config.signin_url()?.as_str(), "https://api.example.com/v1/user/signin");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CredentialsConfig {
    pub(crate) base_url: Url,
    pub(crate) signin_path: String,
}

impl CredentialsConfig {
    /// Create a configuration for the backend rooted at `base_url`.
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        // Url::join replaces the last segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            signin_path: DEFAULT_SIGNIN_PATH.into(),
        }
    }

    /// Override the sign-in path relative to the base URL (default: `user/signin`).
    #[must_use]
    pub fn with_signin_path(mut self, path: impl Into<String>) -> Self {
        self.signin_path = path.into().trim_start_matches('/').to_string();
        self
    }

    /// Backend base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full sign-in endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the configured path does not form a valid URL.
    pub fn signin_url(&self) -> Result<Url, Error> {
        self.base_url
            .join(&self.signin_path)
            .map_err(|e| Error::Transport(format!("invalid sign-in URL: {e}")))
    }
}

/// Email/password pair submitted at the login form.
///
/// Guaranteed non-empty by construction. `Debug` never prints the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Validate and wrap a credential pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either value is missing or empty.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, Error> {
        let email = email.into().trim().to_string();
        let password = password.into();
        if email.is_empty() {
            return Err(Error::InvalidInput("email is required".into()));
        }
        if password.is_empty() {
            return Err(Error::InvalidInput("password is required".into()));
        }
        Ok(Self { email, password })
    }

    /// Build from optional form fields, treating absence like emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either value is missing or empty.
    pub fn from_parts(email: Option<String>, password: Option<String>) -> Result<Self, Error> {
        Self::new(email.unwrap_or_default(), password.unwrap_or_default())
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by the backend sign-in endpoint.
///
/// Only `success` is mandatory at this level: the remaining fields are
/// checked by [`SignInResponse::into_identity`] so that a failed login
/// with a sparse body still yields its message.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct SignInResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// User object nested under `data` in a successful sign-in response.
#[derive(Debug, Clone, Deserialize)]
struct BackendUser {
    id: BackendId,
    name: String,
    role: String,
    email: String,
    #[serde(rename = "phonNumber")]
    phon_number: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BackendId {
    Text(String),
    Number(i64),
}

impl From<BackendId> for UserId {
    fn from(id: BackendId) -> Self {
        match id {
            BackendId::Text(s) => UserId(s),
            BackendId::Number(n) => UserId(n.to_string()),
        }
    }
}

impl SignInResponse {
    /// Map the backend response onto an [`Identity`].
    ///
    /// Renames `phonNumber` to `phone_number` and fails closed when the
    /// success payload is incomplete.
    ///
    /// # Errors
    ///
    /// - [`Error::AuthenticationFailed`] when `success` is `false`
    /// - [`Error::ProtocolMismatch`] when `accessToken` or `data` is missing or ill-typed
    pub fn into_identity(self) -> Result<Identity, Error> {
        if !self.success {
            return Err(Error::AuthenticationFailed(failure_message(self.message)));
        }

        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::ProtocolMismatch("missing accessToken".into()))?;

        let data = self
            .data
            .ok_or_else(|| Error::ProtocolMismatch("missing data".into()))?;
        let user: BackendUser = serde_json::from_value(data)
            .map_err(|e| Error::ProtocolMismatch(format!("data: {e}")))?;

        let id = UserId::from(user.id);
        if id.0.is_empty() {
            return Err(Error::ProtocolMismatch("data: empty id".into()));
        }

        Ok(Identity {
            id,
            name: user.name,
            email: user.email,
            role: Role(user.role),
            phone_number: user.phon_number,
            access_token: AccessToken(access_token),
        })
    }
}

fn failure_message(message: Option<String>) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_SIGNIN_FAILURE.to_string())
}

/// Client for the backend's credentials sign-in endpoint.
pub struct CredentialsClient {
    config: CredentialsConfig,
    http: reqwest::Client,
}

impl CredentialsClient {
    #[must_use]
    pub fn new(config: CredentialsConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CredentialsConfig {
        &self.config
    }

    /// Exchange credentials for an [`Identity`].
    ///
    /// Sends exactly one request. No retries.
    ///
    /// # Errors
    ///
    /// - [`Error::AuthenticationFailed`] on a non-success status or `success: false`
    /// - [`Error::Transport`] on network failure or a non-JSON body
    /// - [`Error::ProtocolMismatch`] when a success body lacks the expected fields
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, Error> {
        let url = self.config.signin_url()?;

        let response = self
            .http
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message")?.as_str().map(str::to_owned));
            tracing::warn!(status = status.as_u16(), email = %credentials.email(), "Sign-in rejected by backend");
            return Err(Error::AuthenticationFailed(failure_message(message)));
        }

        let value: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "Sign-in response is not JSON");
            Error::Transport("received an unreadable response from the server".into())
        })?;

        let response: SignInResponse = serde_json::from_value(value).map_err(|e| {
            tracing::error!(error = %e, "Unexpected sign-in response shape");
            Error::ProtocolMismatch(e.to_string())
        })?;

        response.into_identity().inspect_err(|e| match e {
            Error::AuthenticationFailed(msg) => {
                tracing::warn!(email = %credentials.email(), reason = %msg, "Sign-in failed");
            }
            other => tracing::error!(error = %other, "Sign-in response rejected"),
        })
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    tracing::warn!(error = %e, "Sign-in request failed");
    let message = if e.is_timeout() {
        "the server took too long to respond"
    } else if e.is_connect() {
        "could not reach the server"
    } else if e.is_decode() {
        "received an unreadable response from the server"
    } else {
        "the sign-in request failed"
    };
    Error::Transport(message.into())
}
