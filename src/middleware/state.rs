use std::sync::Arc;

use super::config::AuthSettings;
use crate::session::SessionCodec;

/// Shared state for auth route handlers.
pub(super) struct AuthState<A> {
    pub(super) authenticator: Arc<A>,
    pub(super) codec: Arc<SessionCodec>,
    pub(super) settings: AuthSettings,
}

// Manual Clone: avoid derive adding an `A: Clone` bound.
impl<A> Clone for AuthState<A> {
    fn clone(&self) -> Self {
        Self {
            authenticator: self.authenticator.clone(),
            codec: self.codec.clone(),
            settings: self.settings.clone(),
        }
    }
}
