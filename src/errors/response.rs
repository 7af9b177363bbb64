use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Json,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::codes::ErrorCode;
use super::record::ErrorRecord;

/// Structured error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false for errors
    pub success: bool,
    /// Error details
    pub error: ErrorDetail,
}

/// Error details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// When the error was created (RFC 3339, UTC)
    pub timestamp: String,
    /// Request ID for tracing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Additional context (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Render a record as a response body. Reads only, so repeated calls agree.
pub fn format(record: &ErrorRecord) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: ErrorDetail {
            code: record.code().to_string(),
            message: record.message().to_string(),
            timestamp: record
                .timestamp()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            request_id: record.request_id().map(str::to_string),
            data: record.data().cloned(),
        },
    }
}

impl From<&ErrorRecord> for ErrorResponse {
    fn from(record: &ErrorRecord) -> Self {
        format(record)
    }
}

/// The record rides along in the response extensions so the request
/// boundary can attach a request ID and re-render the body.
impl IntoResponse for ErrorRecord {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Json(format(&self))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Malformed or missing JSON bodies surface as validation errors
impl From<JsonRejection> for ErrorRecord {
    fn from(rejection: JsonRejection) -> Self {
        ErrorCode::ValidationError
            .with_message("malformed request body")
            .with_data(serde_json::json!({ "reason": rejection.body_text() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::define_kind;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_error_response_serialization() {
        let err = ErrorRecord::validation().with_message("Test error");
        let json = serde_json::to_value(format(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Test error");
        assert!(json["error"]["timestamp"].is_string());
        assert!(json["error"].get("requestId").is_none());
        assert!(json["error"].get("data").is_none());
    }

    #[test]
    fn test_error_with_details() {
        let details = json!({
            "field": "email",
            "value": "nope",
            "constraint": "must contain @"
        });
        let err = ErrorRecord::validation()
            .with_data(details.clone())
            .with_request_id("req-1");
        let json = serde_json::to_value(format(&err)).unwrap();
        assert_eq!(json["error"]["requestId"], "req-1");
        assert_eq!(json["error"]["data"], details);
    }

    #[test]
    fn test_identity_preserved() {
        let custom = define_kind("OUT_OF_STOCK", StatusCode::CONFLICT, "out of stock");
        let mut records: Vec<ErrorRecord> = ErrorCode::ALL.into_iter().map(ErrorRecord::new).collect();
        records.push(custom.error());
        for record in records {
            let body = format(&record);
            assert!(!body.success);
            assert_eq!(body.error.code, record.code());
            assert_eq!(body.error.message, record.message());
        }
    }

    #[test]
    fn test_format_is_idempotent() {
        let err = ErrorRecord::resource_conflict().with_data(json!({ "field": "email" }));
        assert_eq!(format(&err), format(&err));
    }

    #[test]
    fn test_timestamp_format() {
        let err = ErrorRecord::internal();
        let body = format(&err);
        assert!(body.error.timestamp.ends_with('Z'));
        let parsed = chrono::DateTime::parse_from_rfc3339(&body.error.timestamp).unwrap();
        assert_eq!(parsed.timestamp_millis(), err.timestamp().timestamp_millis());
    }

    #[test]
    fn test_into_response_status_unauthorized() {
        let response = ErrorRecord::invalid_token().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_into_response_status_unprocessable() {
        let response = ErrorRecord::validation().into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_into_response_status_gateway_timeout() {
        let response = ErrorRecord::timeout().into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_into_response_custom_status() {
        let custom = define_kind("OUT_OF_STOCK", StatusCode::CONFLICT, "out of stock");
        let response = custom.error().into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_into_response_keeps_record() {
        let response = ErrorRecord::user_not_found().into_response();
        let record = response.extensions().get::<ErrorRecord>().unwrap();
        assert_eq!(record.code(), "USER_NOT_FOUND");
    }
}
