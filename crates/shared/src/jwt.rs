//! JWT access-token validation.
//!
//! Tokens are minted by the identity service; the ledger API only verifies
//! the HS256 signature, expiry and token type.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use crate::auth::Claims;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is well-formed but not an access token.
    #[error("invalid token")]
    Invalid,
}

/// JWT service for token verification.
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("decoding_key", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Creates a new JWT service verifying tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validates and decodes an access token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired.
    /// Returns `JwtError::Invalid` if the token is not an access token.
    /// Returns `JwtError::DecodingError` if the token is malformed or badly signed.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        if !claims.is_access() {
            return Err(JwtError::Invalid);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    const SECRET: &str = "test-secret-key-for-testing";

    fn mint(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_token() {
        let service = JwtService::new(SECRET);
        let owner = Uuid::new_v4();
        let token = mint(&Claims::new(owner, Utc::now() + Duration::minutes(15)), SECRET);

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.owner_id().into_inner(), owner);
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(SECRET);
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now() - Duration::hours(1));
        claims.iat -= 7200;
        let token = mint(&claims, SECRET);

        assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_refresh_token_is_rejected() {
        let service = JwtService::new(SECRET);
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now() + Duration::minutes(15));
        claims.typ = "refresh".to_string();
        let token = mint(&claims, SECRET);

        assert!(matches!(service.validate_token(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let service = JwtService::new(SECRET);
        let token = mint(
            &Claims::new(Uuid::new_v4(), Utc::now() + Duration::minutes(15)),
            "another-secret",
        );

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::new(SECRET);
        assert!(service.validate_token("invalid.token.here").is_err());
    }
}
