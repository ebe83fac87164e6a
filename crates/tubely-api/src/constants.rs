//! API constants.

/// Prefix for every route served by the API.
pub const API_PREFIX: &str = "/api";

/// `iss` claim of access tokens accepted by the API.
pub const JWT_ISSUER: &str = "tubely-access";

/// Lifetime of tokens issued by [`crate::auth::jwt::JwtService::issue_token`].
pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Server-level cap on in-flight requests.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;
