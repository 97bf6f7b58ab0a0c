use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

/// Backend user identifier (opaque string).
///
/// The backend owns the format. We only compare and forward it.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Authorization tier reported by the backend (`customer`, `seller`, `admin`, ...).
///
/// Kept as a string: the backend may introduce tiers this crate does not know about.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr, From, Into,
)]
#[serde(transparent)]
pub struct Role(pub String);

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.0.eq_ignore_ascii_case("customer")
    }

    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.0.eq_ignore_ascii_case("seller")
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.eq_ignore_ascii_case("admin")
    }
}

/// Bearer token for downstream backend calls.
///
/// `Debug` is redacted so the token never lands in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct AccessToken(pub String);

impl AccessToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Normalized identity of a signed-in user.
///
/// Produced by the credential authenticator and carried inside the session
/// token for the life of the cookie. Never persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone_number: String,
    pub access_token: AccessToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: UserId::from("1".to_string()),
            name: "A".into(),
            email: "a@b.com".into(),
            role: Role::from("customer".to_string()),
            phone_number: "555".into(),
            access_token: AccessToken::from("tok1".to_string()),
        }
    }

    #[test]
    fn identity_serializes_camel_case() {
        let json = serde_json::to_value(identity()).unwrap();
        assert_eq!(json["phoneNumber"], "555");
        assert_eq!(json["accessToken"], "tok1");
        assert!(json.get("phone_number").is_none());
    }

    #[test]
    fn identity_rejects_unknown_fields() {
        let json = r#"{"id":"1","name":"A","email":"a@b.com","role":"customer",
            "phoneNumber":"555","accessToken":"tok1","isAdmin":true}"#;
        assert!(serde_json::from_str::<Identity>(json).is_err());
    }

    #[test]
    fn identity_rejects_missing_fields() {
        let json = r#"{"id":"1","name":"A","email":"a@b.com","role":"customer"}"#;
        assert!(serde_json::from_str::<Identity>(json).is_err());
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let rendered = format!("{:?}", identity());
        assert!(!rendered.contains("tok1"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn role_helpers() {
        assert!(Role::from("seller".to_string()).is_seller());
        assert!(Role::from("Admin".to_string()).is_admin());
        assert!(Role::from("customer".to_string()).is_customer());
        assert!(!Role::from("courier".to_string()).is_admin());
    }

    #[test]
    fn user_id_from_string() {
        let id = UserId::from("user-123".to_string());
        assert_eq!(id.to_string(), "user-123");
    }
}
