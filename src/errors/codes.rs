use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record::ErrorRecord;

/// Organizational grouping of the predefined error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Auth,
    Business,
    System,
}

/// Predefined error codes for structured API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Access token could not be verified
    InvalidToken,
    /// Access token is past its expiry
    ExpiredToken,
    /// No access token was presented
    MissingToken,
    /// Username/password pair rejected
    InvalidCredentials,
    /// Referenced user does not exist
    UserNotFound,

    /// Referenced resource does not exist
    ResourceNotFound,
    /// Caller lacks the required permission
    PermissionDenied,
    /// Generic business operation failure
    OperationFailed,
    /// Resource already exists
    ResourceConflict,
    /// Usage quota exhausted
    QuotaExceeded,
    /// Too many requests / rate limit exceeded
    RateLimitExceeded,
    /// Input validation failed
    ValidationError,

    /// Internal server error
    InternalError,
    /// Upstream network failure
    NetworkError,
    /// Upstream call timed out
    TimeoutError,
    /// Dependency temporarily unavailable
    ServiceUnavailable,
    /// Service is misconfigured
    ConfigurationError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 17] = [
        Self::InvalidToken,
        Self::ExpiredToken,
        Self::MissingToken,
        Self::InvalidCredentials,
        Self::UserNotFound,
        Self::ResourceNotFound,
        Self::PermissionDenied,
        Self::OperationFailed,
        Self::ResourceConflict,
        Self::QuotaExceeded,
        Self::RateLimitExceeded,
        Self::ValidationError,
        Self::InternalError,
        Self::NetworkError,
        Self::TimeoutError,
        Self::ServiceUnavailable,
        Self::ConfigurationError,
    ];

    /// Stable machine-readable identifier
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::OperationFailed => "OPERATION_FAILED",
            Self::ResourceConflict => "RESOURCE_CONFLICT",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }

    /// Get HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidToken
            | Self::ExpiredToken
            | Self::MissingToken
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserNotFound | Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::OperationFailed => StatusCode::BAD_REQUEST,
            Self::ResourceConflict => StatusCode::CONFLICT,
            Self::QuotaExceeded | Self::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError | Self::ConfigurationError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NetworkError => StatusCode::BAD_GATEWAY,
            Self::TimeoutError => StatusCode::GATEWAY_TIMEOUT,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message used when the caller does not supply one
    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::InvalidToken => "token invalid",
            Self::ExpiredToken => "token expired",
            Self::MissingToken => "missing access token",
            Self::InvalidCredentials => "invalid username or password",
            Self::UserNotFound => "user not found",
            Self::ResourceNotFound => "resource not found",
            Self::PermissionDenied => "permission denied",
            Self::OperationFailed => "operation failed",
            Self::ResourceConflict => "resource already exists",
            Self::QuotaExceeded => "quota exceeded",
            Self::RateLimitExceeded => "rate limit exceeded",
            Self::ValidationError => "validation failed",
            Self::InternalError => "internal system error",
            Self::NetworkError => "network error",
            Self::TimeoutError => "request timeout",
            Self::ServiceUnavailable => "service unavailable",
            Self::ConfigurationError => "configuration error",
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidToken
            | Self::ExpiredToken
            | Self::MissingToken
            | Self::InvalidCredentials
            | Self::UserNotFound => ErrorCategory::Auth,
            Self::ResourceNotFound
            | Self::PermissionDenied
            | Self::OperationFailed
            | Self::ResourceConflict
            | Self::QuotaExceeded
            | Self::RateLimitExceeded
            | Self::ValidationError => ErrorCategory::Business,
            Self::InternalError
            | Self::NetworkError
            | Self::TimeoutError
            | Self::ServiceUnavailable
            | Self::ConfigurationError => ErrorCategory::System,
        }
    }

    /// Build a record of this kind with the default message
    pub fn error(self) -> ErrorRecord {
        ErrorRecord::new(self)
    }

    /// Build a record of this kind with a caller-supplied message
    pub fn with_message(self, message: impl Into<String>) -> ErrorRecord {
        ErrorRecord::new(self).with_message(message)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no predefined code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}
