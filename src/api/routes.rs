use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::any::Any;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    create_user, demo_error, demo_validation, get_user, health, index, list_error_kinds,
    list_products, list_users, login, not_found, profile, purchase_product, AppState,
};
use super::middleware::error_boundary;
use super::openapi::ApiDoc;
use crate::errors::Failure;
use crate::metrics;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    // Panics become opaque failures; the boundary then attaches the request ID
    let normalizer = state.normalizer.clone();
    let catch_panic = CatchPanicLayer::custom(move |payload: Box<dyn Any + Send + 'static>| {
        normalizer
            .normalize(Failure::Opaque(payload), None)
            .into_response()
    });

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/errors/kinds", get(list_error_kinds))
        // Auth
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        // Users
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user))
        // Products
        .route("/products", get(list_products))
        .route("/products/:id/purchase", post(purchase_product))
        // Error demos
        .route("/demo/errors/:type", get(demo_error))
        .route("/demo/validation", post(demo_validation))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        // Order matters: catch panic -> error boundary -> metrics -> cors -> trace
        .layer(catch_panic)
        .layer(middleware::from_fn_with_state(state.clone(), error_boundary))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
