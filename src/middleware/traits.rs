use std::future::Future;

use crate::credentials::{Credentials, CredentialsClient};
use crate::error::Error;
use crate::types::Identity;

/// Exchanges login credentials for an identity.
///
/// [`CredentialsClient`] is the production implementation. Routes are
/// generic over this trait so an app can swap in its own source of truth.
///
/// # Example
///
/// ```rust,ignore
/// struct Fixed(Identity);
///
/// impl Authenticator for Fixed {
///     async fn authenticate(&self, _: &Credentials) -> Result<Identity, Error> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Verify `credentials` and return the matching identity.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Identity, Error>> + Send;
}

impl Authenticator for CredentialsClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, Error> {
        self.sign_in(credentials).await
    }
}
