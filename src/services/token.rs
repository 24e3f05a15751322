//! Token issuance and verification
//!
//! HS256 bearer tokens carrying the account id and role. The service is
//! built once at startup from the configured secret and lives in the shared
//! application state; it is immutable afterwards.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Role;

/// Claims embedded in every issued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: i64,
    /// Role captured at issuance time
    pub role: Role,
    /// Issued-at, Unix seconds UTC
    pub iat: i64,
    /// Expiry, Unix seconds UTC
    pub exp: i64,
}

/// Verification failure kinds surfaced to the authorization layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired. Please log in again.")]
    Expired,
    #[error("Invalid token. Please log in again.")]
    Malformed,
}

/// Signs and verifies bearer tokens with a process-wide secret
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: u64,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    /// Issue a token for an account with the configured lifetime.
    pub fn issue(&self, subject_id: i64, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_expiry(subject_id, role, self.expiry_hours * 3600)
    }

    /// Issue a token with an explicit lifetime in seconds.
    pub fn issue_with_expiry(
        &self,
        subject_id: i64,
        role: Role,
        ttl_secs: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject_id,
            role,
            iat: now,
            exp: now + ttl_secs as i64,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry.
    ///
    /// Expiry is checked manually with zero leeway: a token is rejected the
    /// second its `exp` is no longer in the future. Signature problems and
    /// structural problems both surface as `Malformed`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Malformed)?;

        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        TokenService::new(SECRET, 24)
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let svc = service();
        let token = svc.issue(42, Role::Admin).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_rejected_with_zero_leeway() {
        let svc = service();
        let token = svc.issue_with_expiry(1, Role::User, 0).unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let svc = service();
        assert_eq!(svc.verify("not-a-token"), Err(TokenError::Malformed));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let token = service().issue(1, Role::User).unwrap();
        let other = TokenService::new("another-secret-another-secret-32", 24);
        assert_eq!(other.verify(&token), Err(TokenError::Malformed));
    }
}
