use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractors::Identity;
use crate::error::{AppError, INVALID_CREDENTIALS};

/// Lifetime of an access token, also used as the cookie `Max-Age`.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: Uuid,
    /// The user's email address at the time of login.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Signs and verifies HS256 access tokens with the process-wide secret.
///
/// Built once at startup from [`Config`](crate::config::Config) and shared
/// read-only through `AppState`. Changing the secret invalidates every
/// outstanding token.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::days(TOKEN_TTL_DAYS),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `identity`, expiring [`TOKEN_TTL_DAYS`] from now.
    pub fn sign(&self, identity: &Identity) -> Result<String, AppError> {
        self.sign_at(identity, Utc::now())
    }

    /// Issues a token as if it had been issued at `issued_at`.
    pub fn sign_at(&self, identity: &Identity, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: identity.id,
            email: identity.email.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Checks signature and expiry and resolves the identity the token carries.
    ///
    /// Tampered, malformed and expired tokens all fail the same way:
    /// `AppError::Unauthorized("Invalid Credentials")`.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| Identity {
                id: data.claims.sub,
                email: data.claims.email,
            })
            .map_err(|e| {
                log::debug!("Rejected access token: {}", e);
                AppError::Unauthorized(INVALID_CREDENTIALS.into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
        }
    }

    fn assert_rejected(result: Result<Identity, AppError>) {
        match result {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid Credentials"),
            other => panic!("Token should have been rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = TokenService::new("test_secret_for_gen_verify");
        let identity = identity();

        let token = tokens.sign(&identity).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), identity);
    }

    #[test]
    fn test_claims_expire_after_seven_days() {
        let tokens = TokenService::new("test_secret_for_claims");
        let issued_at = Utc::now();
        let token = tokens.sign_at(&identity(), issued_at).unwrap();

        let claims = decode::<Claims>(&token, &tokens.decoding, &tokens.validation)
            .unwrap()
            .claims;
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_within_horizon_is_accepted() {
        let tokens = TokenService::new("test_secret_for_horizon");
        let identity = identity();

        let token = tokens
            .sign_at(&identity, Utc::now() - Duration::days(6))
            .unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), identity);
    }

    #[test]
    fn test_token_expiration() {
        let tokens = TokenService::new("test_secret_for_expiration");

        let expired_token = tokens
            .sign_at(&identity(), Utc::now() - Duration::days(8))
            .unwrap();
        assert_rejected(tokens.verify(&expired_token));
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = TokenService::new("secret-A").sign(&identity()).unwrap();
        assert_rejected(TokenService::new("secret-B").verify(&token));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let tokens = TokenService::new("test_secret_for_tamper");
        let token = tokens.sign(&identity()).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        // The payload segment always starts with "eyJ" (base64 for `{"`).
        let tampered_payload = format!("f{}", &parts[1][1..]);
        let tampered = format!("{}.{}.{}", parts[0], tampered_payload, parts[2]);

        assert_rejected(tokens.verify(&tampered));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let tokens = TokenService::new("test_secret_for_garbage");
        assert_rejected(tokens.verify("not-a-token"));
        assert_rejected(tokens.verify(""));
    }
}
