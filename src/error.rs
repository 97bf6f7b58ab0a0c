/// Message shown when the backend rejects a login without saying why.
pub(crate) const GENERIC_SIGNIN_FAILURE: &str = "Invalid email or password";

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or empty credentials. The user is re-prompted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bad credentials, or the backend reported a failure.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Network failure or a body that is not JSON.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a shape we do not understand.
    #[error("Protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// Session token could not be minted.
    #[error("Token error: {0}")]
    Token(String),
}

impl Error {
    /// Text that is safe to show to the person at the login form.
    ///
    /// Backend messages pass through unchanged; internal detail from
    /// protocol and token failures never does.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) | Self::AuthenticationFailed(msg) | Self::Transport(msg) => {
                msg.clone()
            }
            Self::ProtocolMismatch(_) | Self::Token(_) => GENERIC_FAILURE.to_string(),
        }
    }
}
