//! Turning whatever failed into an [`ErrorRecord`].

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use tracing::error;

use super::codes::ErrorCode;
use super::record::ErrorRecord;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A failure caught at a boundary
pub enum Failure {
    /// Already part of the taxonomy
    Record(ErrorRecord),
    /// A regular error with a message
    Error(BoxError),
    /// Anything else, e.g. a panic payload. Never echoed to clients.
    Opaque(Box<dyn Any + Send + 'static>),
}

impl Failure {
    pub fn opaque<T: Any + Send + 'static>(value: T) -> Self {
        Self::Opaque(Box::new(value))
    }

    /// Wrap a boxed error, unwrapping it if it is a record
    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<ErrorRecord>() {
            Ok(record) => Self::Record(*record),
            Err(err) => Self::Error(err),
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Self::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<ErrorRecord> for Failure {
    fn from(record: ErrorRecord) -> Self {
        Self::Record(record)
    }
}

impl From<BoxError> for Failure {
    fn from(err: BoxError) -> Self {
        Self::from_boxed(err)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ErrorRecord>() {
            Ok(record) => Self::Record(record),
            Err(err) => Self::Error(err.into()),
        }
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        Self::Error(Box::new(err))
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Self::Error(Box::new(err))
    }
}

/// Receives diagnostics for failures that were not already records
pub trait DiagnosticSink: Send + Sync {
    fn unexpected_error(&self, err: &(dyn StdError + 'static), request_id: Option<&str>);

    fn unknown_failure(&self, request_id: Option<&str>);
}

/// Drops all diagnostics
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn unexpected_error(&self, _err: &(dyn StdError + 'static), _request_id: Option<&str>) {}

    fn unknown_failure(&self, _request_id: Option<&str>) {}
}

/// Logs diagnostics through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn unexpected_error(&self, err: &(dyn StdError + 'static), request_id: Option<&str>) {
        error!(
            request_id = request_id.unwrap_or("-"),
            error = %err,
            "Unexpected error"
        );
    }

    fn unknown_failure(&self, request_id: Option<&str>) {
        error!(request_id = request_id.unwrap_or("-"), "Unknown failure");
    }
}

/// Maps failures into the taxonomy, reporting to an injected sink
#[derive(Clone)]
pub struct Normalizer {
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(NoopSink))
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

impl Normalizer {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    /// Normalize `failure`, attaching `request_id` if the result has none yet.
    ///
    /// Records pass through untouched apart from the request ID. Errors
    /// become `INTERNAL_ERROR` with their message; anything else becomes
    /// `INTERNAL_ERROR` with the default message.
    pub fn normalize(&self, failure: impl Into<Failure>, request_id: Option<&str>) -> ErrorRecord {
        let record = match failure.into() {
            Failure::Record(record) => record,
            Failure::Error(err) => {
                self.sink.unexpected_error(&*err, request_id);
                let message = err.to_string();
                if message.is_empty() {
                    ErrorRecord::internal()
                } else {
                    ErrorCode::InternalError.with_message(message)
                }
            }
            Failure::Opaque(_) => {
                self.sink.unknown_failure(request_id);
                ErrorRecord::internal()
            }
        };

        if let Some(request_id) = request_id {
            record.set_request_id(request_id);
        }
        record
    }
}

/// Normalize without diagnostics
pub fn normalize(failure: impl Into<Failure>, request_id: Option<&str>) -> ErrorRecord {
    Normalizer::default().normalize(failure, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::define_kind;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl DiagnosticSink for RecordingSink {
        fn unexpected_error(&self, err: &(dyn StdError + 'static), request_id: Option<&str>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error:{}:{}", err, request_id.unwrap_or("")));
        }

        fn unknown_failure(&self, request_id: Option<&str>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("unknown:{}", request_id.unwrap_or("")));
        }
    }

    #[test]
    fn test_record_gets_request_id_once() {
        let record = ErrorRecord::validation();
        let record = normalize(record, Some("req-1"));
        assert_eq!(record.request_id(), Some("req-1"));

        let record = normalize(record, Some("req-2"));
        assert_eq!(record.request_id(), Some("req-1"));
        assert_eq!(record.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_record_passes_through() {
        let custom = define_kind("OUT_OF_STOCK", StatusCode::CONFLICT, "out of stock");
        let original = custom.error();
        let timestamp = original.timestamp();
        let record = normalize(original, None);
        assert_eq!(record.code(), "OUT_OF_STOCK");
        assert_eq!(record.status_code(), StatusCode::CONFLICT);
        assert_eq!(record.timestamp(), timestamp);
        assert!(record.request_id().is_none());
    }

    #[test]
    fn test_generic_error_keeps_message() {
        let record = normalize(anyhow::anyhow!("boom"), Some("req-1"));
        assert_eq!(record.code(), "INTERNAL_ERROR");
        assert_eq!(record.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(record.message(), "boom");
        assert_eq!(record.request_id(), Some("req-1"));
        assert!(record.data().is_none());
    }

    #[test]
    fn test_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let record = normalize(err, None);
        assert_eq!(record.code(), "INTERNAL_ERROR");
        assert_eq!(record.message(), "disk on fire");
    }

    #[test]
    fn test_empty_message_falls_back() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "");
        let record = normalize(err, None);
        assert_eq!(record.message(), "internal system error");
    }

    #[test]
    fn test_opaque_value_not_echoed() {
        let record = normalize(Failure::opaque("oops"), None);
        assert_eq!(record.code(), "INTERNAL_ERROR");
        assert_eq!(record.message(), "internal system error");
        assert_ne!(record.message(), "oops");
    }

    #[test]
    fn test_wrapped_record_is_unwrapped() {
        let wrapped = anyhow::Error::new(ErrorRecord::permission_denied());
        let record = normalize(wrapped, Some("req-9"));
        assert_eq!(record.code(), "PERMISSION_DENIED");
        assert_eq!(record.status_code(), StatusCode::FORBIDDEN);

        let boxed: BoxError = Box::new(ErrorRecord::quota_exceeded());
        let record = normalize(boxed, None);
        assert_eq!(record.code(), "QUOTA_EXCEEDED");
    }

    #[test]
    fn test_sink_sees_only_unexpected_failures() {
        let sink = Arc::new(RecordingSink::default());
        let normalizer = Normalizer::new(sink.clone());

        normalizer.normalize(ErrorRecord::validation(), Some("a"));
        normalizer.normalize(anyhow::anyhow!("boom"), Some("b"));
        normalizer.normalize(Failure::opaque(42_u32), None);

        let events = sink.events.lock().unwrap();
        assert_eq!(*events, vec!["error:boom:b".to_string(), "unknown:".to_string()]);
    }
}
