use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub iss: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Authenticated caller, stored in request extensions by the auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

// Extracted from request parts so it can be combined with Multipart
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().copied().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Missing authentication context".to_string(),
                    details: None,
                    error_type: None,
                    code: "UNAUTHORIZED".to_string(),
                    recoverable: false,
                    suggested_action: Some("Check the bearer token".to_string()),
                }),
            )
        })
    }
}
