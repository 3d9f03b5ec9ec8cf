//! Order handlers.
//!
//! Customers see and act on their own orders only; the admin routes cover
//! the fulfilment side (status changes, deletion, the full order list).

use axum::{
    extract::{Extension, Path, State},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CreateOrder, OrderDetails, TrackingView};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

/// Status change request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    #[schema(example = "shipped")]
    pub status: String,
}

/// Create order routes (authenticated)
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/create", post(create_order))
        .route("/admin/all", get(list_all_orders))
        .route("/:id", get(get_order).delete(delete_order))
        .route("/:id/track", get(track_order))
        .route("/:id/status", put(update_status))
        .route("/:id/cancel", put(cancel_order))
        .route("/:id/return", put(request_return))
}

/// Place an order from the request lines or the caller's cart
#[utoipa::path(
    post,
    path = "/api/orders/create",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order created", body = OrderDetails),
        (status = 400, description = "Empty cart, bad quantity or insufficient stock"),
        (status = 403, description = "Admins cannot place orders"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn create_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrder>,
) -> AppResult<Created<OrderDetails>> {
    let order = state.orders().create_order(current_user.id, payload).await?;
    Ok(Created::new(order, "Order created successfully"))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "The caller's orders, newest first", body = Vec<OrderDetails>))
)]
pub async fn list_orders(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OrderDetails>>> {
    let orders = state.orders().list_orders(current_user.id).await?;
    Ok(ApiResponse::success(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = OrderDetails),
        (status = 403, description = "Not the order's owner"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<OrderDetails>> {
    let order = state.orders().get_order(current_user.id, id).await?;
    Ok(ApiResponse::success(order))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/track",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Tracking view", body = TrackingView),
        (status = 403, description = "Not the order's owner"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn track_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<TrackingView>> {
    let view = state.orders().track_order(current_user.id, id).await?;
    Ok(ApiResponse::success(view))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/cancel",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderDetails),
        (status = 400, description = "Order can no longer be cancelled"),
        (status = 403, description = "Not the order's owner"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn cancel_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<OrderDetails>> {
    let order = state.orders().cancel_order(current_user.id, id).await?;
    Ok(ApiResponse::with_message(order, "Order cancelled successfully"))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/return",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Return requested", body = OrderDetails),
        (status = 400, description = "Only delivered orders can be returned"),
        (status = 403, description = "Not the order's owner"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn request_return(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<OrderDetails>> {
    let order = state.orders().request_return(current_user.id, id).await?;
    Ok(ApiResponse::with_message(order, "Return requested successfully"))
}

/// Every order with its buyer (admin only)
#[utoipa::path(
    get,
    path = "/api/orders/admin/all",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All orders", body = Vec<OrderDetails>),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_all_orders(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OrderDetails>>> {
    require_admin(&current_user)?;
    let orders = state.orders().list_all_orders().await?;
    Ok(ApiResponse::success(orders))
}

/// Move an order to any status (admin only)
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderDetails),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<ApiResponse<OrderDetails>> {
    require_admin(&current_user)?;
    let order = state.orders().update_status(id, payload.status).await?;
    Ok(ApiResponse::with_message(order, "Order status updated"))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&current_user)?;
    state.orders().delete_order(id).await?;
    Ok(ApiResponse::message("Order deleted successfully"))
}
