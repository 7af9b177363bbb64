use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderName, StatusCode, Uri},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{
    custom::PAYMENT_FAILED, CustomKind, ErrorCategory, ErrorCode, ErrorRecord, ErrorResponse,
    KindError, KindRegistry, Normalizer,
};
use crate::models::{seed_products, seed_users, Order, Product, User};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

/// Raised when a purchase asks for more than is in stock
pub const OUT_OF_STOCK: CustomKind =
    CustomKind::from_static("OUT_OF_STOCK", StatusCode::CONFLICT, "product out of stock");

pub const VALID_TOKEN: &str = "valid-token";
pub const EXPIRED_TOKEN: &str = "expired-token";

pub type AppState = Arc<AppStateInner>;

pub type ApiResult<T> = Result<T, ErrorRecord>;

pub struct AppStateInner {
    pub users: RwLock<Vec<User>>,
    pub products: RwLock<Vec<Product>>,
    pub kinds: KindRegistry,
    pub normalizer: Normalizer,
    pub request_id_header: HeaderName,
}

impl AppStateInner {
    /// State with the demo users, products and custom kinds
    pub fn seeded(normalizer: Normalizer, request_id_header: HeaderName) -> Result<Self, KindError> {
        let mut kinds = KindRegistry::with_catalog();
        kinds.register(OUT_OF_STOCK)?;

        Ok(Self {
            users: RwLock::new(seed_users()),
            products: RwLock::new(seed_products()),
            kinds,
            normalizer,
            request_id_header,
        })
    }
}

/// Correlation ID for the current request, set by the error boundary
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Identity extracted from a bearer token
#[derive(Debug, Clone)]
pub struct Claims {
    pub user_id: u64,
    pub role: String,
}

/// Check the bearer token in the `Authorization` header
pub fn authorize(headers: &HeaderMap) -> ApiResult<Claims> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
        .filter(|v| !v.is_empty());

    match token {
        None => Err(ErrorRecord::missing_token()),
        Some(EXPIRED_TOKEN) => Err(ErrorCode::ExpiredToken
            .with_message("token expired, please sign in again")),
        Some(VALID_TOKEN) => Ok(Claims {
            user_id: 1,
            role: "user".to_string(),
        }),
        Some(_) => Err(ErrorCode::InvalidToken.with_message("invalid access token")),
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn missing_fields(fields: &[(&str, &Option<String>)]) -> Vec<String> {
    fields
        .iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| name.to_string())
        .collect()
}

fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse().map_err(|_| {
        ErrorCode::ValidationError
            .with_message("invalid id")
            .with_data(json!({
                "field": "id",
                "value": raw,
                "constraint": "must be a number"
            }))
    })
}

/// Login request body
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// New user request body
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub success: bool,
    pub user: User,
}

/// Purchase request body; an empty body buys one unit
#[derive(Debug, Deserialize, ToSchema)]
#[serde(default)]
pub struct PurchaseRequest {
    pub quantity: u32,
}

impl Default for PurchaseRequest {
    fn default() -> Self {
        Self { quantity: 1 }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub success: bool,
    pub order: Order,
}

/// One entry of the error kind catalog
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorKindInfo {
    pub code: String,
    pub status: u16,
    pub default_message: String,
    /// `auth`, `business`, `system` or `custom`
    pub category: String,
}

/// Service index
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "unified error handling demo",
        "endpoints": {
            "auth": {
                "login": "POST /auth/login",
                "profile": "GET /auth/profile (requires token)"
            },
            "users": {
                "list": "GET /users",
                "detail": "GET /users/:id",
                "create": "POST /users"
            },
            "products": {
                "list": "GET /products",
                "purchase": "POST /products/:id/purchase"
            },
            "demo": {
                "errors": "GET /demo/errors/:type",
                "validation": "POST /demo/validation"
            },
            "errors": "GET /errors/kinds"
        },
        "testTokens": {
            "valid": VALID_TOKEN,
            "expired": EXPIRED_TOKEN,
            "invalid": "invalid-token"
        }
    }))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "unified-errors",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// List every error kind the service can return
#[utoipa::path(
    get,
    path = "/errors/kinds",
    tag = "errors",
    responses(
        (status = 200, description = "Known error kinds", body = [ErrorKindInfo])
    )
)]
pub async fn list_error_kinds(State(state): State<AppState>) -> Json<Vec<ErrorKindInfo>> {
    let predefined = ErrorCode::ALL.into_iter().map(|code| ErrorKindInfo {
        code: code.as_str().to_string(),
        status: code.status_code().as_u16(),
        default_message: code.default_message().to_string(),
        category: match code.category() {
            ErrorCategory::Auth => "auth",
            ErrorCategory::Business => "business",
            ErrorCategory::System => "system",
        }
        .to_string(),
    });
    let custom = state.kinds.iter().map(|kind| ErrorKindInfo {
        code: kind.code().to_string(),
        status: kind.status_code().as_u16(),
        default_message: kind.default_message().to_string(),
        category: "custom".to_string(),
    });

    Json(predefined.chain(custom).collect())
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 422, description = "Missing fields", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(body) = body?;

    let missing = missing_fields(&[("email", &body.email), ("password", &body.password)]);
    if !missing.is_empty() {
        return Err(ErrorCode::ValidationError
            .with_message("email and password are required")
            .with_data(json!({ "missingFields": missing })));
    }
    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let users = state.users.read().await;
    let user = users.iter().find(|u| u.email == email).ok_or_else(|| {
        ErrorRecord::user_not_found().with_data(json!({ "email": email }))
    })?;

    if user.password != password {
        return Err(ErrorCode::InvalidCredentials
            .with_message("wrong password")
            .with_data(json!({
                "email": email,
                "suggestion": "check that the password is correct"
            })));
    }

    info!("User {} signed in", user.id);
    Ok(Json(LoginResponse {
        success: true,
        token: VALID_TOKEN.to_string(),
        user: user.clone(),
    }))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    )
)]
pub async fn profile(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<User>> {
    let claims = authorize(&headers)?;

    let users = state.users.read().await;
    users
        .iter()
        .find(|u| u.id == claims.user_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ErrorRecord::user_not_found().with_data(json!({ "userId": claims.user_id })))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = [User])
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.read().await.clone())
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "Numeric user ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "ID is not a number", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let user_id = parse_id(&id)?;

    let users = state.users.read().await;
    users
        .iter()
        .find(|u| u.id == user_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ErrorRecord::user_not_found().with_data(json!({ "userId": user_id })))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    let Json(body) = body?;

    let missing = missing_fields(&[("email", &body.email), ("password", &body.password)]);
    if !missing.is_empty() {
        return Err(ErrorCode::ValidationError
            .with_message("email and password are required")
            .with_data(json!({ "missingFields": missing })));
    }
    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    if !email.contains('@') {
        return Err(ErrorCode::ValidationError
            .with_message("malformed email address")
            .with_data(json!({
                "field": "email",
                "value": email,
                "constraint": "must contain @"
            })));
    }

    let mut users = state.users.write().await;
    if users.iter().any(|u| u.email == email) {
        return Err(ErrorCode::ResourceConflict
            .with_message("email already in use")
            .with_data(json!({
                "field": "email",
                "value": email,
                "suggestion": "use a different email address"
            })));
    }

    let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
    let user = User::new(id, email, password, body.role.unwrap_or_else(|| "user".to_string()));
    users.push(user.clone());

    info!("Created user {}", id);
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            success: true,
            user,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses(
        (status = 200, description = "All products", body = [Product])
    )
)]
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.products.read().await.clone())
}

/// Buy a product
#[utoipa::path(
    post,
    path = "/products/{id}/purchase",
    tag = "products",
    params(
        ("id" = String, Path, description = "Numeric product ID")
    ),
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Order placed", body = PurchaseResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "Unknown product", body = ErrorResponse),
        (status = 409, description = "Not enough stock", body = ErrorResponse)
    )
)]
pub async fn purchase_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<PurchaseResponse>> {
    authorize(&headers)?;
    let product_not_found = |product_id: Value| {
        ErrorCode::ResourceNotFound
            .with_message("product not found")
            .with_data(json!({ "productId": product_id }))
    };
    let product_id: u64 = id.parse().map_err(|_| product_not_found(json!(id)))?;

    let request = if body.is_empty() {
        PurchaseRequest::default()
    } else {
        serde_json::from_slice::<PurchaseRequest>(&body).map_err(|e| {
            ErrorCode::ValidationError
                .with_message("malformed request body")
                .with_data(json!({ "reason": e.to_string() }))
        })?
    };
    if request.quantity == 0 {
        return Err(ErrorCode::ValidationError
            .with_message("quantity must be at least 1")
            .with_data(json!({ "field": "quantity", "value": 0 })));
    }

    let mut products = state.products.write().await;
    let product = products
        .iter_mut()
        .find(|p| p.id == product_id)
        .ok_or_else(|| product_not_found(json!(product_id)))?;

    if product.stock < request.quantity {
        return Err(OUT_OF_STOCK.build(
            Some("insufficient stock".to_string()),
            Some(json!({
                "productId": product_id,
                "productName": product.name,
                "requestedQuantity": request.quantity,
                "availableStock": product.stock
            })),
        ));
    }

    product.stock -= request.quantity;
    debug!("Product {} stock now {}", product.id, product.stock);

    Ok(Json(PurchaseResponse {
        success: true,
        order: Order {
            id: Uuid::new_v4().to_string(),
            product_id,
            product_name: product.name.clone(),
            quantity: request.quantity,
            unit_price: product.price,
            total_amount: product.price * u64::from(request.quantity),
            purchased_at: Utc::now(),
        },
    }))
}

const DEMO_ERROR_TYPES: [&str; 7] = [
    "auth",
    "permission",
    "validation",
    "system",
    "custom",
    "unknown",
    "panic",
];

/// Trigger a sample error of the given type
#[utoipa::path(
    get,
    path = "/demo/errors/{type}",
    tag = "demo",
    params(
        ("type" = String, Path, description = "auth, permission, validation, system, custom, unknown or panic")
    ),
    responses(
        (status = 401, description = "auth", body = ErrorResponse),
        (status = 403, description = "permission", body = ErrorResponse),
        (status = 422, description = "validation, custom or unsupported type", body = ErrorResponse),
        (status = 500, description = "unknown or panic", body = ErrorResponse),
        (status = 503, description = "system", body = ErrorResponse)
    )
)]
pub async fn demo_error(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Value>> {
    let err = match kind.as_str() {
        "auth" => ErrorCode::InvalidToken.with_message("demo authentication error"),
        "permission" => ErrorCode::PermissionDenied
            .with_message("demo permission error")
            .with_data(json!({ "requiredRole": "admin", "currentRole": "user" })),
        "validation" => ErrorCode::ValidationError
            .with_message("demo validation error")
            .with_data(json!({ "field": "email", "constraint": "must be a valid email address" })),
        "system" => ErrorCode::ServiceUnavailable
            .with_message("demo system error")
            .with_data(json!({ "service": "database", "retryAfter": 30 })),
        "custom" => PAYMENT_FAILED.build(
            Some("demo custom error".to_string()),
            Some(json!({ "paymentMethod": "credit_card", "errorCode": "INSUFFICIENT_FUNDS" })),
        ),
        "unknown" => state.normalizer.normalize(
            anyhow::anyhow!("unknown error, reported as INTERNAL_ERROR"),
            Some(request_id.0.as_str()),
        ),
        "panic" => panic!("demo panic"),
        other => ErrorCode::ValidationError
            .with_message("unsupported error type")
            .with_data(json!({
                "field": "type",
                "value": other,
                "allowedValues": DEMO_ERROR_TYPES
            })),
    };
    Err(err)
}

fn text_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Validate a sample form, reporting every failing field at once
#[utoipa::path(
    post,
    path = "/demo/validation",
    tag = "demo",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Form is valid", body = serde_json::Value),
        (status = 422, description = "Form is invalid", body = ErrorResponse)
    )
)]
pub async fn demo_validation(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let mut errors = Vec::new();

    if text_field(&body, "name").is_none() {
        errors.push(json!({ "field": "name", "message": "name is required" }));
    }

    match text_field(&body, "email") {
        None => errors.push(json!({ "field": "email", "message": "email is required" })),
        Some(email) if !email.contains('@') => {
            errors.push(json!({ "field": "email", "message": "malformed email address" }))
        }
        Some(_) => {}
    }

    match body.get("age").filter(|v| !v.is_null()) {
        None => errors.push(json!({ "field": "age", "message": "age is required" })),
        Some(age) => match age.as_f64() {
            Some(age) if (0.0..=150.0).contains(&age) => {}
            _ => errors.push(json!({ "field": "age", "message": "age must be between 0 and 150" })),
        },
    }

    if !errors.is_empty() {
        let summary = format!("{} field(s) failed validation", errors.len());
        return Err(ErrorCode::ValidationError
            .with_message("form validation failed")
            .with_data(json!({ "errors": errors, "summary": summary })));
    }

    Ok(Json(json!({ "success": true, "message": "validation passed" })))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ErrorRecord {
    ErrorCode::ResourceNotFound
        .with_message("route not found")
        .with_data(json!({ "path": uri.path() }))
}
