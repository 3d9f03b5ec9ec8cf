//! Cart handlers. Every route acts on the caller's own cart.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Cart;
use crate::errors::AppResult;
use crate::types::ApiResponse;

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(alias = "product_id")]
    pub product_id: Uuid,
    #[serde(default = "one")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default, alias = "selected_color", alias = "color")]
    pub selected_color: Option<String>,
}

/// Quantity zero or below removes the line
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    #[serde(alias = "product_id")]
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(default, alias = "selected_color", alias = "color")]
    pub selected_color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    #[serde(alias = "product_id")]
    pub product_id: Uuid,
    #[serde(default, alias = "selected_color", alias = "color")]
    pub selected_color: Option<String>,
}

/// Create cart routes (authenticated)
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/update", post(update_cart))
        .route("/remove", post(remove_from_cart))
        .route("/clear", post(clear_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "The caller's cart", body = Cart))
)]
pub async fn get_cart(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Cart>> {
    let cart = state.carts().get_cart(current_user.id).await?;
    Ok(ApiResponse::success(cart))
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    tag = "Cart",
    security(("bearer_auth" = [])),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn add_to_cart(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddToCartRequest>,
) -> AppResult<ApiResponse<Cart>> {
    let cart = state
        .carts()
        .add_item(
            current_user.id,
            payload.product_id,
            payload.quantity,
            payload.selected_color,
        )
        .await?;
    Ok(ApiResponse::with_message(cart, "Item added to cart"))
}

#[utoipa::path(
    post,
    path = "/api/cart/update",
    tag = "Cart",
    security(("bearer_auth" = [])),
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 404, description = "Cart item not found")
    )
)]
pub async fn update_cart(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateCartRequest>,
) -> AppResult<ApiResponse<Cart>> {
    let cart = state
        .carts()
        .update_item(
            current_user.id,
            payload.product_id,
            payload.quantity,
            payload.selected_color,
        )
        .await?;
    Ok(ApiResponse::with_message(cart, "Cart updated"))
}

#[utoipa::path(
    post,
    path = "/api/cart/remove",
    tag = "Cart",
    security(("bearer_auth" = [])),
    request_body = RemoveFromCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 404, description = "Cart item not found")
    )
)]
pub async fn remove_from_cart(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RemoveFromCartRequest>,
) -> AppResult<ApiResponse<Cart>> {
    let cart = state
        .carts()
        .remove_item(current_user.id, payload.product_id, payload.selected_color)
        .await?;
    Ok(ApiResponse::with_message(cart, "Item removed from cart"))
}

#[utoipa::path(
    post,
    path = "/api/cart/clear",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Empty cart", body = Cart))
)]
pub async fn clear_cart(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Cart>> {
    let cart = state.carts().clear(current_user.id).await?;
    Ok(ApiResponse::with_message(cart, "Cart cleared"))
}
