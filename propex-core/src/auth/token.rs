use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, Result};

/// Claims carried by an access token. Derived from a verified credential,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    /// Comma-joined role names, forwarded verbatim as `X-User-Roles`.
    pub roles: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signs an HS256 access token with the shared symmetric secret.
pub fn issue_token(secret: &str, sub: Uuid, roles: &str, ttl_secs: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub,
        roles: roles.to_string(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|err| CoreError::Crypto(err.to_string()))
}

/// Verifies signature and expiry. Every failure mode collapses into
/// [`CoreError::Unauthorized`] so callers cannot tell a malformed token
/// from an expired one.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| CoreError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_verifies_and_carries_claims() {
        let sub = Uuid::new_v4();
        let token = issue_token(SECRET, sub, "USER,AGENT", 900).unwrap();

        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.roles, "USER,AGENT");
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4(), "USER", -100).unwrap();
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(CoreError::Unauthorized)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4(), "USER", 900).unwrap();
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(CoreError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_is_rejected_identically() {
        assert!(matches!(
            verify_token(SECRET, "not-a-token"),
            Err(CoreError::Unauthorized)
        ));
    }
}
