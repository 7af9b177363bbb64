//! Structured error handling for API responses

pub mod codes;
pub mod custom;
pub mod normalize;
pub mod record;
pub mod response;

pub use codes::{ErrorCategory, ErrorCode, UnknownErrorCode};
pub use custom::{define_kind, CustomKind, KindError, KindRegistry};
pub use normalize::{normalize, DiagnosticSink, Failure, NoopSink, Normalizer, TracingSink};
pub use record::{ErrorKind, ErrorRecord};
pub use response::{format, ErrorDetail, ErrorResponse};
