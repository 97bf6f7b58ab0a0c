use serde::Serialize;
use time::OffsetDateTime;

use crate::session::Session;

/// Body of `GET {auth_path}/session` for a signed-in user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: SessionViewUser,
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

/// Public part of the identity. The access token sits beside it, not inside.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionViewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone_number: String,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        let identity = &session.identity;
        Self {
            user: SessionViewUser {
                id: identity.id.to_string(),
                name: identity.name.clone(),
                email: identity.email.clone(),
                role: identity.role.to_string(),
                phone_number: identity.phone_number.clone(),
            },
            access_token: identity.access_token.as_str().to_string(),
            expires: session.expires_at,
        }
    }
}
