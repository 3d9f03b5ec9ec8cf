//! Authentication handlers.
//!
//! Public account routes under `/api/users`: registration, the two login
//! flavors and the password-reset flow.

use axum::{extract::State, routing::get, routing::post, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::MIN_PASSWORD_LENGTH;
use crate::domain::{NewUser, UserRole};
use crate::errors::AppResult;
use crate::services::{AuthSession, ResetCodeIssued};
use crate::types::{ApiResponse, Created};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Asha Rao")]
    pub name: String,
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "asha@example.com")]
    pub email: String,
    /// User password (minimum 6 characters)
    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "Password must be at least 6 characters"))]
    #[schema(example = "shop-secret", min_length = 6)]
    pub password: String,
    #[serde(default)]
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    /// `admin` is only granted while no admin exists
    #[serde(default)]
    #[schema(example = "customer")]
    pub role: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "asha@example.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "shop-secret")]
    pub password: String,
}

/// Phone login request; unknown numbers get a new customer account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PhoneLoginRequest {
    #[serde(default)]
    #[schema(example = "9876543210")]
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Reset code request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendResetCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "asha@example.com")]
    pub email: String,
}

/// Reset code check
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyResetCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(alias = "code")]
    #[validate(length(min = 1, message = "OTP is required"))]
    #[schema(example = "482913")]
    pub otp: String,
}

/// New password with a valid reset code
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(alias = "code")]
    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
    #[serde(alias = "new_password", alias = "password")]
    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminExists {
    pub admin_exists: bool,
}

/// Create public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/phone-login", post(phone_login))
        .route("/check-admin-exists", get(check_admin_exists))
        .route("/password-reset/send-otp", post(send_reset_code))
        .route("/password-reset/verify-otp", post(verify_reset_code))
        .route("/password-reset/reset", post(reset_password))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthSession),
        (status = 400, description = "Validation error or admin slot taken"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<AuthSession>> {
    let role = payload
        .role
        .as_deref()
        .map(UserRole::from)
        .unwrap_or(UserRole::Customer);

    let session = state
        .auth()
        .register(NewUser {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            password: payload.password,
            role,
        })
        .await?;

    Ok(Created::new(session, "User registered successfully"))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthSession),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state.auth().login(payload.email, payload.password).await?;
    Ok(ApiResponse::with_message(session, "Login successful"))
}

/// Login with a phone number, creating the account on first use
#[utoipa::path(
    post,
    path = "/api/users/phone-login",
    tag = "Authentication",
    request_body = PhoneLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthSession),
        (status = 400, description = "Phone number is required")
    )
)]
pub async fn phone_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PhoneLoginRequest>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state
        .auth()
        .phone_login(payload.phone, payload.name, payload.email)
        .await?;
    Ok(ApiResponse::with_message(session, "Login successful"))
}

/// Whether an admin account exists
#[utoipa::path(
    get,
    path = "/api/users/check-admin-exists",
    tag = "Authentication",
    responses((status = 200, description = "Admin slot state", body = AdminExists))
)]
pub async fn check_admin_exists(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AdminExists>> {
    let admin_exists = state.users().admin_exists().await?;
    Ok(ApiResponse::success(AdminExists { admin_exists }))
}

/// Email a password reset code
#[utoipa::path(
    post,
    path = "/api/users/password-reset/send-otp",
    tag = "Authentication",
    request_body = SendResetCodeRequest,
    responses(
        (status = 200, description = "Code issued", body = ResetCodeIssued),
        (status = 404, description = "User not found")
    )
)]
pub async fn send_reset_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SendResetCodeRequest>,
) -> AppResult<ApiResponse<ResetCodeIssued>> {
    let issued = state.auth().send_reset_code(payload.email).await?;
    let message = issued.message.clone();
    Ok(ApiResponse::with_message(issued, message))
}

/// Check a password reset code
#[utoipa::path(
    post,
    path = "/api/users/password-reset/verify-otp",
    tag = "Authentication",
    request_body = VerifyResetCodeRequest,
    responses(
        (status = 200, description = "Code accepted"),
        (status = 400, description = "Missing, expired or wrong code"),
        (status = 429, description = "Too many failed attempts")
    )
)]
pub async fn verify_reset_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyResetCodeRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .auth()
        .verify_reset_code(payload.email, payload.otp)
        .await?;
    Ok(ApiResponse::message("OTP verified successfully"))
}

/// Set a new password using a reset code
#[utoipa::path(
    post,
    path = "/api/users/password-reset/reset",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Missing, expired or wrong code"),
        (status = 429, description = "Too many failed attempts")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .auth()
        .reset_password(payload.email, payload.otp, payload.new_password)
        .await?;
    Ok(ApiResponse::message("Password reset successfully"))
}
