#![doc = include_str!("../README.md")]

#[cfg(feature = "credentials")]
pub mod credentials;
pub mod error;
#[cfg(feature = "middleware")]
pub mod middleware;
pub mod paths;
#[cfg(feature = "session")]
pub mod session;
pub mod types;

// Re-exports for convenient access
#[cfg(feature = "credentials")]
pub use credentials::{Credentials, CredentialsClient, CredentialsConfig, SignInResponse};
pub use error::Error;
pub use paths::{PathRules, matches_prefix};
#[cfg(feature = "session")]
pub use session::{SESSION_MAX_AGE, Session, SessionCodec, SessionKey};
pub use types::{AccessToken, Identity, Role, UserId};
