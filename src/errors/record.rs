use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use super::codes::ErrorCode;

/// Discriminator for a record: one of the predefined codes or an ad-hoc code string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Predefined(ErrorCode),
    Custom(Cow<'static, str>),
}

impl ErrorKind {
    pub fn code(&self) -> &str {
        match self {
            Self::Predefined(code) => code.as_str(),
            Self::Custom(code) => code,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<ErrorCode> for ErrorKind {
    fn from(code: ErrorCode) -> Self {
        Self::Predefined(code)
    }
}

/// A single failure, ready to be rendered as an HTTP error response.
///
/// Status code, code string and timestamp are fixed when the record is
/// built. The request ID can be attached later, but only once.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ErrorRecord {
    kind: ErrorKind,
    status: StatusCode,
    message: String,
    timestamp: DateTime<Utc>,
    request_id: OnceLock<String>,
    data: Option<Value>,
}

impl ErrorRecord {
    /// Create a record of a predefined kind with its default message
    pub fn new(code: ErrorCode) -> Self {
        Self::from_parts(
            ErrorKind::Predefined(code),
            code.status_code(),
            code.default_message(),
        )
    }

    pub(crate) fn from_parts(kind: ErrorKind, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            timestamp: Utc::now(),
            request_id: OnceLock::new(),
            data: None,
        }
    }

    /// Replace the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a structured payload
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach a request ID while still building the record
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        self.set_request_id(request_id);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn code(&self) -> &str {
        self.kind.code()
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.get().map(String::as_str)
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// True if this record was built from the given predefined code
    pub fn is(&self, code: ErrorCode) -> bool {
        self.kind == ErrorKind::Predefined(code)
    }

    /// Set the request ID if none is set yet.
    ///
    /// Empty IDs are ignored. Returns whether the ID was stored.
    pub fn set_request_id(&self, request_id: impl Into<String>) -> bool {
        let request_id = request_id.into();
        if request_id.is_empty() {
            return false;
        }
        self.request_id.set(request_id).is_ok()
    }
}

/// Shorthand constructors for the predefined kinds
impl ErrorRecord {
    pub fn invalid_token() -> Self {
        Self::new(ErrorCode::InvalidToken)
    }

    pub fn expired_token() -> Self {
        Self::new(ErrorCode::ExpiredToken)
    }

    pub fn missing_token() -> Self {
        Self::new(ErrorCode::MissingToken)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn user_not_found() -> Self {
        Self::new(ErrorCode::UserNotFound)
    }

    pub fn resource_not_found() -> Self {
        Self::new(ErrorCode::ResourceNotFound)
    }

    pub fn permission_denied() -> Self {
        Self::new(ErrorCode::PermissionDenied)
    }

    pub fn operation_failed() -> Self {
        Self::new(ErrorCode::OperationFailed)
    }

    pub fn resource_conflict() -> Self {
        Self::new(ErrorCode::ResourceConflict)
    }

    pub fn quota_exceeded() -> Self {
        Self::new(ErrorCode::QuotaExceeded)
    }

    pub fn rate_limit_exceeded() -> Self {
        Self::new(ErrorCode::RateLimitExceeded)
    }

    pub fn validation() -> Self {
        Self::new(ErrorCode::ValidationError)
    }

    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError)
    }

    pub fn network() -> Self {
        Self::new(ErrorCode::NetworkError)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorCode::TimeoutError)
    }

    pub fn service_unavailable() -> Self {
        Self::new(ErrorCode::ServiceUnavailable)
    }

    pub fn configuration() -> Self {
        Self::new(ErrorCode::ConfigurationError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_for_every_code() {
        for code in ErrorCode::ALL {
            let err = ErrorRecord::new(code);
            assert_eq!(err.code(), code.as_str());
            assert_eq!(err.status_code(), code.status_code());
            assert_eq!(err.message(), code.default_message());
            assert!(err.request_id().is_none());
            assert!(err.data().is_none());
        }
    }

    #[test]
    fn test_overrides_for_every_code() {
        for code in ErrorCode::ALL {
            let payload = json!({ "field": "email", "value": "x", "constraint": "must contain @" });
            let err = code.with_message("custom").with_data(payload.clone());
            assert_eq!(err.message(), "custom");
            assert_eq!(err.data(), Some(&payload));
            assert_eq!(err.code(), code.as_str());
            assert_eq!(err.status_code(), code.status_code());
        }
    }

    #[test]
    fn test_request_id_set_once() {
        let err = ErrorRecord::validation();
        assert!(!err.set_request_id(""));
        assert!(err.request_id().is_none());

        assert!(err.set_request_id("req-1"));
        assert!(!err.set_request_id("req-2"));
        assert_eq!(err.request_id(), Some("req-1"));
    }

    #[test]
    fn test_request_id_survives_clone() {
        let err = ErrorRecord::timeout().with_request_id("req-1");
        let copy = err.clone();
        assert!(!copy.set_request_id("req-2"));
        assert_eq!(copy.request_id(), Some("req-1"));
    }

    #[test]
    fn test_request_id_concurrent_set() {
        let err = std::sync::Arc::new(ErrorRecord::internal());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let err = err.clone();
                std::thread::spawn(move || err.set_request_id(format!("req-{i}")))
            })
            .collect();
        let stored = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(stored, 1);
        assert!(err.request_id().is_some());
    }

    #[test]
    fn test_display_is_message() {
        let err = ErrorRecord::user_not_found().with_message("no user 999");
        assert_eq!(err.to_string(), "no user 999");
        assert!(err.is(ErrorCode::UserNotFound));
        assert!(!err.is(ErrorCode::ResourceNotFound));
    }
}
