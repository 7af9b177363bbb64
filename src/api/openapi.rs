use utoipa::OpenApi;

use crate::api::handlers::{
    CreateUserRequest, CreateUserResponse, ErrorKindInfo, LoginRequest, LoginResponse,
    PurchaseRequest, PurchaseResponse,
};
use crate::errors::{ErrorDetail, ErrorResponse};
use crate::models::{Order, Product, User};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Unified Errors Demo",
        version = "0.1.0",
        description = "Demo service for the unified error taxonomy. Every failure is returned as `{ success: false, error: { code, message, timestamp, requestId, data } }` with the status code of its kind.",
        contact(
            name = "Unified Errors API",
        )
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::list_error_kinds,
        crate::api::handlers::login,
        crate::api::handlers::profile,
        crate::api::handlers::list_users,
        crate::api::handlers::get_user,
        crate::api::handlers::create_user,
        crate::api::handlers::list_products,
        crate::api::handlers::purchase_product,
        crate::api::handlers::demo_error,
        crate::api::handlers::demo_validation,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorDetail,
            ErrorKindInfo,
            LoginRequest,
            LoginResponse,
            CreateUserRequest,
            CreateUserResponse,
            PurchaseRequest,
            PurchaseResponse,
            User,
            Product,
            Order,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "errors", description = "Error kind catalog"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "products", description = "Product and purchase endpoints"),
        (name = "demo", description = "Endpoints that return sample errors"),
    )
)]
pub struct ApiDoc;
