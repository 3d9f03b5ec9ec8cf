//! Coupon handlers.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{Coupon, CouponInput, CouponQuote};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

/// Checkout-time coupon check
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    #[validate(length(min = 1, message = "Coupon code is required"))]
    #[schema(example = "SAVE10")]
    pub code: String,
    #[serde(alias = "order_total", alias = "total")]
    #[schema(value_type = String, example = "1000")]
    pub order_total: Decimal,
}

/// Public coupon routes
pub fn coupon_routes() -> Router<AppState> {
    Router::new().route("/validate", post(validate_coupon))
}

/// Coupon maintenance routes (admin, behind authentication)
pub fn coupon_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_coupon))
        .route("/all", get(list_coupons))
        .route("/:id", put(update_coupon).delete(delete_coupon))
}

#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    tag = "Coupons",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "Discount for this order", body = CouponQuote),
        (status = 400, description = "Expired, exhausted or below the minimum order"),
        (status = 404, description = "Coupon not found")
    )
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ValidateCouponRequest>,
) -> AppResult<ApiResponse<CouponQuote>> {
    let quote = state
        .coupons()
        .validate(payload.code, payload.order_total)
        .await?;
    Ok(ApiResponse::with_message(quote, "Coupon applied successfully"))
}

#[utoipa::path(
    post,
    path = "/api/coupons/create",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    request_body = CouponInput,
    responses(
        (status = 201, description = "Coupon created", body = Coupon),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 409, description = "Coupon code already exists")
    )
)]
pub async fn create_coupon(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CouponInput>,
) -> AppResult<Created<Coupon>> {
    require_admin(&current_user)?;
    let coupon = state.coupons().create(payload).await?;
    Ok(Created::new(coupon, "Coupon created successfully"))
}

#[utoipa::path(
    get,
    path = "/api/coupons/all",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All coupons", body = Vec<Coupon>),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_coupons(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Coupon>>> {
    require_admin(&current_user)?;
    let coupons = state.coupons().list().await?;
    Ok(ApiResponse::success(coupons))
}

#[utoipa::path(
    put,
    path = "/api/coupons/{id}",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Coupon ID")),
    request_body = CouponInput,
    responses(
        (status = 200, description = "Coupon updated", body = Coupon),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Coupon not found")
    )
)]
pub async fn update_coupon(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CouponInput>,
) -> AppResult<ApiResponse<Coupon>> {
    require_admin(&current_user)?;
    let coupon = state.coupons().update(id, payload).await?;
    Ok(ApiResponse::with_message(coupon, "Coupon updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/coupons/{id}",
    tag = "Coupons",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Coupon deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Coupon not found")
    )
)]
pub async fn delete_coupon(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&current_user)?;
    state.coupons().delete(id).await?;
    Ok(ApiResponse::message("Coupon deleted successfully"))
}
