//! HS256 access tokens

use crate::auth::models::JwtClaims;
use crate::constants::{ACCESS_TOKEN_TTL_SECS, JWT_ISSUER};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tubely_core::AppError;
use uuid::Uuid;

/// Issues and validates HS256 access tokens signed with `JWT_SECRET`
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token for `user_id` valid for `ttl_secs` (default one hour).
    pub fn issue_token(&self, user_id: Uuid, ttl_secs: Option<i64>) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: user_id,
            iss: JWT_ISSUER.to_string(),
            iat: now,
            exp: now + ttl_secs.unwrap_or(ACCESS_TOKEN_TTL_SECS),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token and return the caller's user id
    pub fn validate_token(&self, token: &str) -> Result<Uuid, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AppError::Unauthorized("Invalid token issuer".to_string())
                }
                _ => AppError::Unauthorized("Invalid or expired token".to_string()),
            }
        })?;

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    #[test]
    fn test_issue_and_validate() {
        let service = JwtService::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = service.issue_token(user_id, None).unwrap();
        assert_eq!(service.validate_token(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new(SECRET);
        let token = service.issue_token(Uuid::new_v4(), Some(-60)).unwrap();
        let err = service.validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m.contains("expired")));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new(SECRET);
        let other = JwtService::new("another-secret-that-is-at-least-32-chars");
        let token = issuer.issue_token(Uuid::new_v4(), None).unwrap();
        assert!(matches!(
            other.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: Uuid::new_v4(),
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = JwtService::new(SECRET).validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m.contains("issuer")));
    }

    #[test]
    fn test_garbage_rejected() {
        let service = JwtService::new(SECRET);
        assert!(service.validate_token("not.a.jwt").is_err());
        assert!(service.validate_token("").is_err());
    }
}
