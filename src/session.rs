use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::version4::V4;
use pasetors::{Local, local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::error::Error;
use crate::types::{AccessToken, Identity, Role, UserId};

/// Maximum lifetime of a session token, counted from its issue time.
pub const SESSION_MAX_AGE: Duration = Duration::days(7);

const TOKEN_PREFIX: &str = "v4.local.";
const KEY_CONTEXT: &[u8] = b"storefront-auth session key\0";

/// Symmetric key (32 bytes) derived from the server-held session secret.
#[derive(Clone)]
pub struct SessionKey {
    bytes: [u8; 32],
}

impl SessionKey {
    /// Derives the session key from a secret of any length.
    ///
    /// # Errors
    ///
    /// Returns `Error::Token` if the secret is empty.
    pub fn derive(secret: &str) -> Result<Self, Error> {
        if secret.trim().is_empty() {
            return Err(Error::Token("session secret is empty".into()));
        }
        let mut hasher = Sha256::new();
        hasher.update(KEY_CONTEXT);
        hasher.update(secret.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Ok(Self { bytes })
    }

    fn symmetric(&self) -> Result<SymmetricKey<V4>, Error> {
        SymmetricKey::<V4>::from(&self.bytes[..]).map_err(|e| Error::Token(e.to_string()))
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

/// A verified, unexpired session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Whether the token is old enough that the cookie should be re-issued.
    #[must_use]
    pub fn needs_refresh(&self, now: OffsetDateTime, update_age: Duration) -> bool {
        now - self.issued_at >= update_age
    }
}

/// Token payload. Every field is required and nothing else is accepted.
///
/// Times use unregistered claim names so pasetors never checks them
/// against the wall clock; `verify` owns every time check.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SessionClaims {
    id: UserId,
    name: String,
    email: String,
    role: Role,
    phone_number: String,
    access_token: AccessToken,
    #[serde(with = "time::serde::rfc3339")]
    issued_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    not_before: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    expires_at: OffsetDateTime,
}

impl SessionClaims {
    fn issue(identity: &Identity, now: OffsetDateTime) -> Self {
        let identity = identity.clone();
        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            role: identity.role,
            phone_number: identity.phone_number,
            access_token: identity.access_token,
            issued_at: now,
            not_before: now,
            expires_at: now + SESSION_MAX_AGE,
        }
    }

    fn into_session(self) -> Session {
        Session {
            identity: Identity {
                id: self.id,
                name: self.name,
                email: self.email,
                role: self.role,
                phone_number: self.phone_number,
                access_token: self.access_token,
            },
            issued_at: self.issued_at,
            expires_at: self.expires_at,
        }
    }
}

/// Mints and verifies PASETO `v4.local` session tokens.
///
/// Tokens are encrypted and authenticated with the [`SessionKey`]; a token
/// only decodes if it was produced with the same secret, has not been
/// altered, and has not expired.
#[derive(Debug, Clone)]
pub struct SessionCodec {
    key: SessionKey,
}

impl SessionCodec {
    #[must_use]
    pub fn new(key: SessionKey) -> Self {
        Self { key }
    }

    /// Encodes an identity issued now.
    ///
    /// # Errors
    ///
    /// Returns `Error::Token` if the claims cannot be serialized or encrypted.
    pub fn encode(&self, identity: &Identity) -> Result<String, Error> {
        self.encode_at(identity, OffsetDateTime::now_utc())
    }

    /// Encodes an identity issued at `now`, expiring [`SESSION_MAX_AGE`] later.
    ///
    /// # Errors
    ///
    /// Returns `Error::Token` if the claims cannot be serialized or encrypted.
    pub fn encode_at(&self, identity: &Identity, now: OffsetDateTime) -> Result<String, Error> {
        let payload = serde_json::to_string(&SessionClaims::issue(identity, now))
            .map_err(|e| Error::Token(e.to_string()))?;
        let claims = Claims::from_string(&payload).map_err(|e| Error::Token(e.to_string()))?;
        let key = self.key.symmetric()?;

        local::encrypt(&key, &claims, None, None).map_err(|e| Error::Token(e.to_string()))
    }

    /// Decodes a token checked against the current time.
    #[must_use]
    pub fn decode(&self, token: &str) -> Option<Session> {
        self.decode_at(token, OffsetDateTime::now_utc())
    }

    /// Decodes a token checked against `now`.
    ///
    /// Any failure (foreign key, tampering, expiry, unexpected claims)
    /// yields `None`. Callers treat it exactly like a missing cookie.
    #[must_use]
    pub fn decode_at(&self, token: &str, now: OffsetDateTime) -> Option<Session> {
        match self.verify(token, now) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                None
            }
        }
    }

    fn verify(&self, token: &str, now: OffsetDateTime) -> Result<Session, Error> {
        let body = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| Error::Token("invalid token format".into()))?;

        // Canonical base64url only; this also rules out a footer segment.
        URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| Error::Token("invalid token encoding".into()))?;

        let key = self.key.symmetric()?;

        // Expiry is checked below against the caller's clock.
        let mut validation_rules = ClaimsValidationRules::new();
        validation_rules.disable_valid_at();
        validation_rules.allow_non_expiring();

        let untrusted_token = UntrustedToken::<Local, V4>::try_from(token)
            .map_err(|e| Error::Token(e.to_string()))?;
        let trusted_token = local::decrypt(&key, &untrusted_token, &validation_rules, None, None)
            .map_err(|e| Error::Token(e.to_string()))?;

        let payload = trusted_token
            .payload_claims()
            .ok_or_else(|| Error::Token("missing payload".into()))?;
        let payload_str = payload
            .to_string()
            .map_err(|e| Error::Token(e.to_string()))?;
        let claims: SessionClaims =
            serde_json::from_str(&payload_str).map_err(|e| Error::Token(e.to_string()))?;

        if now >= claims.expires_at {
            return Err(Error::Token("token expired".into()));
        }
        if now < claims.not_before {
            return Err(Error::Token("token not yet valid".into()));
        }

        Ok(claims.into_session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn identity() -> Identity {
        Identity {
            id: UserId("1".into()),
            name: "A".into(),
            email: "a@b.com".into(),
            role: Role("customer".into()),
            phone_number: "555".into(),
            access_token: AccessToken("tok1".into()),
        }
    }

    fn codec(secret: &str) -> SessionCodec {
        SessionCodec::new(SessionKey::derive(secret).unwrap())
    }

    const T: OffsetDateTime = datetime!(2026-03-01 12:00:00 UTC);

    #[test]
    fn empty_secret_is_rejected() {
        assert!(SessionKey::derive("").is_err());
        assert!(SessionKey::derive("   ").is_err());
    }

    #[test]
    fn round_trip_preserves_identity() {
        let codec = codec("secret");
        let token = codec.encode_at(&identity(), T).unwrap();
        assert!(token.starts_with("v4.local."));

        let session = codec.decode_at(&token, T + Duration::hours(1)).unwrap();
        assert_eq!(session.identity, identity());
        assert_eq!(session.issued_at, T);
        assert_eq!(session.expires_at, T + SESSION_MAX_AGE);
    }

    #[test]
    fn token_does_not_leak_claims_in_clear() {
        let token = codec("secret").encode_at(&identity(), T).unwrap();
        let body = URL_SAFE_NO_PAD
            .decode(token.trim_start_matches(TOKEN_PREFIX))
            .unwrap();
        let haystack = String::from_utf8_lossy(&body);
        assert!(!haystack.contains("a@b.com"));
        assert!(!haystack.contains("tok1"));
    }

    #[test]
    fn expiry_follows_caller_clock_not_wall_clock() {
        let codec = codec("secret");
        let issued = datetime!(2020-01-10 08:00:00 UTC);
        let token = codec.encode_at(&identity(), issued).unwrap();

        let session = codec.decode_at(&token, issued + Duration::days(3)).unwrap();
        assert_eq!(session.identity, identity());
        assert_eq!(session.expires_at, issued + SESSION_MAX_AGE);
        assert!(codec.decode_at(&token, issued + SESSION_MAX_AGE).is_none());
    }

    #[test]
    fn registered_time_claims_are_absent() {
        let codec = codec("secret");
        let token = codec.encode_at(&identity(), T).unwrap();
        let key = codec.key.symmetric().unwrap();
        let mut rules = ClaimsValidationRules::new();
        rules.disable_valid_at();
        rules.allow_non_expiring();
        let untrusted = UntrustedToken::<Local, V4>::try_from(token.as_str()).unwrap();
        let trusted = local::decrypt(&key, &untrusted, &rules, None, None).unwrap();
        let claims = trusted.payload_claims().unwrap();

        for registered in ["iat", "nbf", "exp"] {
            assert!(claims.get_claim(registered).is_none(), "{registered} present");
        }
        assert!(claims.get_claim("expiresAt").is_some());
    }

    #[test]
    fn valid_until_just_before_expiry() {
        let codec = codec("secret");
        let token = codec.encode_at(&identity(), T).unwrap();
        let last_moment = T + SESSION_MAX_AGE - Duration::seconds(1);
        assert!(codec.decode_at(&token, last_moment).is_some());
    }

    #[test]
    fn invalid_at_and_after_expiry() {
        let codec = codec("secret");
        let token = codec.encode_at(&identity(), T).unwrap();
        assert!(codec.decode_at(&token, T + SESSION_MAX_AGE).is_none());
        assert!(codec.decode_at(&token, T + Duration::days(30)).is_none());
    }

    #[test]
    fn invalid_before_issue_time() {
        let codec = codec("secret");
        let token = codec.encode_at(&identity(), T).unwrap();
        assert!(codec.decode_at(&token, T - Duration::minutes(5)).is_none());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = codec("secret-a").encode_at(&identity(), T).unwrap();
        assert!(codec("secret-b").decode_at(&token, T).is_none());
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let codec = codec("secret");
        let token = codec.encode_at(&identity(), T).unwrap();
        let bytes = token.as_bytes();

        for index in 0..bytes.len() {
            for bit in 0..8 {
                let mut mutated = bytes.to_vec();
                mutated[index] ^= 1 << bit;
                // A non-UTF-8 cookie value never reaches the codec.
                let Ok(mutated) = String::from_utf8(mutated) else {
                    continue;
                };
                assert!(
                    codec.decode_at(&mutated, T).is_none(),
                    "bit {bit} of byte {index} flipped but token still decoded"
                );
            }
        }
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = codec("secret");
        assert!(codec.decode_at("", T).is_none());
        assert!(codec.decode_at("not-a-token", T).is_none());
        assert!(codec.decode_at("v4.local.", T).is_none());
        assert!(codec.decode_at("v4.public.AAAA", T).is_none());
    }

    #[test]
    fn footer_segment_is_rejected() {
        let codec = codec("secret");
        let token = codec.encode_at(&identity(), T).unwrap();
        assert!(codec.decode_at(&format!("{token}.e30"), T).is_none());
    }

    #[test]
    fn refresh_after_update_age() {
        let codec = codec("secret");
        let token = codec.encode_at(&identity(), T).unwrap();
        let session = codec.decode_at(&token, T).unwrap();

        assert!(!session.needs_refresh(T + Duration::hours(23), Duration::hours(24)));
        assert!(session.needs_refresh(T + Duration::hours(24), Duration::hours(24)));
    }
}
