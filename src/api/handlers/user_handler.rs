//! User handlers.

use axum::{
    extract::{Extension, Path, State},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{Address, ProfileChanges, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::types::ApiResponse;

/// Profile update request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    /// New display name
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Asha Rao")]
    pub name: Option<String>,
    /// New phone number
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    pub address: Option<Address>,
}

/// Promotion request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MakeAdminRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "asha@example.com")]
    pub email: String,
}

/// Create authenticated user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/make-admin", post(make_admin))
        .route("/:id", delete(delete_user))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.users().get_user(current_user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let changes = ProfileChanges {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
    };

    let user = state.users().update_profile(current_user.id, changes).await?;
    Ok(ApiResponse::with_message(
        UserResponse::from(user),
        "Profile updated successfully",
    ))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    require_admin(&current_user)?;
    let users = state.users().list_users().await?;
    Ok(ApiResponse::success(
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

/// Delete user with their orders and cart (admin only, cannot delete self)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 400, description = "Cannot delete your own account or the admin"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    require_admin(&current_user)?;

    if current_user.id == id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    state.users().delete_user(id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}

/// Promote an account to admin (admin only)
#[utoipa::path(
    post,
    path = "/api/users/make-admin",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = MakeAdminRequest,
    responses(
        (status = 200, description = "User promoted", body = UserResponse),
        (status = 400, description = "Already admin or admin slot taken"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn make_admin(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<MakeAdminRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_admin(&current_user)?;
    let user = state.users().make_admin(payload.email).await?;
    Ok(ApiResponse::with_message(
        UserResponse::from(user),
        "User promoted to admin",
    ))
}
