//! Session gate and credentials login for Axum.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use storefront_auth::middleware::{AuthConfig, auth_routes, require_session};
//!
//! // 1. Configure from environment (AUTH_SECRET, BACKEND_API_URL)
//! let config = AuthConfig::from_env()?;
//! let client = config.credentials_client();
//! let gate = config.gate();
//!
//! // 2. Mount auth routes and put every route behind the gate
//! let app = axum::Router::new()
//!     .route("/", get(home))
//!     .merge(auth_routes(config, client))
//!     .layer(axum::middleware::from_fn_with_state(gate, require_session));
//!
//! // 3. Read the verified user in handlers
//! async fn home(user: SessionUser) -> String {
//!     format!("Hello, {}", user.identity.name)
//! }
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod gate;
mod routes;
mod state;
mod traits;
mod types;

pub use config::{AuthConfig, SESSION_COOKIE_NAME};
pub use error::AuthError;
pub use extractor::SessionUser;
pub use gate::{Gate, GateOutcome, require_session};
pub use routes::auth_routes;
pub use traits::Authenticator;
pub use types::{SessionView, SessionViewUser};
