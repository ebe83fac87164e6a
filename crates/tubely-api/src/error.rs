//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that converts into
//! `AppError` renders with a consistent status, body and log line.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_processing::ProcessingError;
use tubely_storage::StorageError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether resubmitting the request may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
///
/// Needed because of the orphan rule: `IntoResponse` and `AppError` are both foreign here.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Build the response body, hiding details in production and for sensitive errors.
pub fn error_body(app_error: &AppError, is_production: bool) -> ErrorResponse {
    let expose_details = !is_production && !app_error.is_sensitive();
    ErrorResponse {
        error: app_error.client_message(),
        details: expose_details.then(|| app_error.detailed_message()),
        error_type: expose_details.then(|| app_error.error_type().to_string()),
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}

// Domain error conversions. `From` impls into `AppError` itself would violate the orphan
// rule, so the mapping lives in free functions reused by the services.

/// Map an object store failure onto the API error taxonomy.
///
/// The gateway is only called to put or presign. A failure of either is a storage failure,
/// including a rejected key or a client that could not be configured.
pub fn storage_error_to_app(err: StorageError) -> AppError {
    AppError::StorageFailure(err.to_string())
}

/// Map a media tool failure onto the API error taxonomy.
pub fn processing_error_to_app(err: ProcessingError) -> AppError {
    match err {
        ProcessingError::InvalidConfiguration(msg) => AppError::Internal(msg),
        other => AppError::ProcessingFailure(other.to_string()),
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error_to_app(err))
    }
}

impl From<ProcessingError> for HttpAppError {
    fn from(err: ProcessingError) -> Self {
        HttpAppError(processing_error_to_app(err))
    }
}
