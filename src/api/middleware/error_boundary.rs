use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::handlers::{AppState, RequestId};
use crate::errors::ErrorRecord;

/// Assigns a request ID and finishes every error response.
///
/// The ID comes from the configured header when the caller sent one,
/// otherwise a fresh UUID. Error records produced further down get the ID
/// attached (unless they already carry one) and their body re-rendered.
pub async fn error_boundary(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(&state.request_id_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Some(record) = response.extensions_mut().remove::<ErrorRecord>() {
        let record = state.normalizer.normalize(record, Some(request_id.as_str()));
        let status = record.status_code();

        if status.is_server_error() {
            error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %status.as_u16(),
                code = %record.code(),
                duration_ms = %duration.as_millis(),
                "Request failed (server error)"
            );
        } else {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %status.as_u16(),
                code = %record.code(),
                duration_ms = %duration.as_millis(),
                "Request failed (client error)"
            );
        }

        response = record.into_response();
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %response.status().as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(state.request_id_header.clone(), value);
    }

    response
}
