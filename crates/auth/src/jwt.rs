//! HS256 token issue/verify behind an object-safe seam.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    /// The token is malformed or its signature does not verify.
    #[error("invalid token")]
    Decode,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// Verifies a bearer token and returns its claims.
///
/// Object-safe so the HTTP layer can hold `Arc<dyn JwtValidator>` and tests
/// can substitute their own implementation.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HMAC-SHA256 token codec over a shared secret.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Jwt {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign claims into a compact token.
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        // Expiry lives in the `expires_at` claim and is checked by
        // `validate_claims`, not by the default numeric `exp` handling.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|_| JwtError::Decode)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use campushub_core::UserId;

    #[test]
    fn issued_token_round_trips() {
        let jwt = Hs256Jwt::new(b"test-secret");
        let now = Utc::now();
        let claims = JwtClaims::session(UserId::new(), Role::Admin, now);

        let token = jwt.issue(&claims).unwrap();
        let decoded = jwt.validate(&token, now).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = Hs256Jwt::new(b"test-secret");
        let issued = Utc::now() - chrono::Duration::hours(3);
        let claims = JwtClaims::session(UserId::new(), Role::Student, issued);

        let token = jwt.issue(&claims).unwrap();
        let err = jwt.validate(&token, Utc::now()).unwrap_err();

        assert!(matches!(err, JwtError::Claims(TokenValidationError::Expired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = Hs256Jwt::new(b"secret-a");
        let verifier = Hs256Jwt::new(b"secret-b");
        let claims = JwtClaims::session(UserId::new(), Role::Student, Utc::now());

        let token = issuer.issue(&claims).unwrap();
        let err = verifier.validate(&token, Utc::now()).unwrap_err();

        assert!(matches!(err, JwtError::Decode));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let jwt = Hs256Jwt::new(b"test-secret");
        assert!(matches!(
            jwt.validate("not-a-token", Utc::now()).unwrap_err(),
            JwtError::Decode
        ));
    }
}
