use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::registry::{record_error, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::errors::ErrorRecord;

/// Label for requests that hit no route, so unknown URLs share one series
pub const UNMATCHED_PATH: &str = "unmatched";

/// Route template for the request, e.g. `/users/:id`
fn path_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string())
}

/// Middleware to track HTTP request metrics, including error responses by code
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = path_label(&req);

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    if let Some(record) = response.extensions().get::<ErrorRecord>() {
        record_error(record.code(), status);
    }

    response
}
