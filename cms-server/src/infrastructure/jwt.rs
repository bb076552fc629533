use crate::domain::DomainError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Session tokens stay valid this long after issuance.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims embedded in a session token. Handlers trust these without
/// re-querying the credential store unless claim refresh is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Result<Self, DomainError> {
        if secret.len() < 32 {
            tracing::warn!(
                "JWT secret is too short ({} chars). Minimum recommended is 32 chars.",
                secret.len()
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn generate_token(&self, user_id: i64, username: String) -> Result<String, DomainError> {
        tracing::debug!(
            "Generating token for user_id: {}, username: {}",
            user_id,
            username
        );

        let issued_at = Utc::now();
        let expiration = issued_at
            .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
            .expect("valid timestamp");

        let claims = Claims {
            user_id,
            username,
            iat: issued_at.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        match encode(&Header::default(), &claims, &self.encoding_key) {
            Ok(token) => Ok(token),
            Err(e) => {
                tracing::error!("Failed to encode token: {}", e);
                Err(DomainError::InternalError(format!(
                    "Failed to generate token: {}",
                    e
                )))
            }
        }
    }

    /// Rejects absent, malformed, expired and wrongly-signed tokens alike;
    /// on success hands back the embedded claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, DomainError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                tracing::debug!("Token verified for user_id: {}", token_data.claims.user_id);
                Ok(token_data.claims)
            }
            Err(e) => {
                tracing::debug!("Token verification failed: {}", e);
                Err(DomainError::Unauthorized(format!("Invalid token: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_the_original_claims() {
        let service = JwtService::new("a-test-secret-that-is-long-enough!!").unwrap();

        let token = service.generate_token(42, "alice".to_string()).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(
            claims.exp - claims.iat,
            (TOKEN_TTL_HOURS * 3600) as usize,
            "validity window is 24 hours"
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = JwtService::new("a-test-secret-that-is-long-enough!!").unwrap();

        // Craft a token that expired well past the decoder's leeway.
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            user_id: 7,
            username: "bob".to_string(),
            iat: now - 90_000,
            exp: now - 3_600,
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key).unwrap();

        let err = service.verify_token(&token).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let issuer = JwtService::new("a-test-secret-that-is-long-enough!!").unwrap();
        let verifier = JwtService::new("a-different-secret-also-long-enough").unwrap();

        let token = issuer.generate_token(1, "alice".to_string()).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let service = JwtService::new("a-test-secret-that-is-long-enough!!").unwrap();
        assert!(service.verify_token("not-a-token").is_err());
        assert!(service.verify_token("").is_err());
    }
}
