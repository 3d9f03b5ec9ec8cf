//! Authentication service - registration, login and password reset.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::notifier::{email_best_effort, Notifier};
use super::user_service::ensure_admin_slot_free;
use crate::config::{Config, LOCK_ADMIN_SLOT, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{NewUser, Password, ResetChallenge, ResetVerdict, User, UserResponse, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{ResourceLock, UnitOfWork};
use crate::utils::templates;

/// Verified against when the email is unknown, so both paths cost one hash.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("placeholder-password")
        .map(Password::into_string)
        .unwrap_or_default()
});

const RESET_CODE_MISSING: &str = "No OTP request found. Please request a new OTP.";
const RESET_CODE_EXPIRED: &str = "OTP has expired. Please request a new one.";
const RESET_CODE_EXHAUSTED: &str = "Too many failed attempts. Please request a new OTP.";

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 604800)]
    pub expires_in: i64,
}

/// Authenticated account plus its token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthSession {
    pub user: UserResponse,
    #[serde(flatten)]
    pub token: TokenResponse,
}

/// Outcome of requesting a reset code
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetCodeIssued {
    pub message: String,
    /// Only populated in development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_otp: Option<String>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register an account; `admin` is only granted while the slot is free
    async fn register(&self, input: NewUser) -> AppResult<AuthSession>;

    /// Email + password login
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Find or create a customer by phone number
    async fn phone_login(
        &self,
        phone: String,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<AuthSession>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Issue a reset code and email it
    async fn send_reset_code(&self, email: String) -> AppResult<ResetCodeIssued>;

    /// Check a reset code, counting failed attempts
    async fn verify_reset_code(&self, email: String, code: String) -> AppResult<()>;

    /// Set a new password with a valid reset code
    async fn reset_password(&self, email: String, code: String, new_password: String)
        -> AppResult<()>;
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Generate JWT token for a user
fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify JWT token and extract claims
fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    notifier: Arc<dyn Notifier>,
    locks: Arc<dyn ResourceLock>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(
        uow: Arc<U>,
        config: Config,
        notifier: Arc<dyn Notifier>,
        locks: Arc<dyn ResourceLock>,
    ) -> Self {
        Self {
            uow,
            config,
            notifier,
            locks,
        }
    }

    fn session(&self, user: User) -> AppResult<AuthSession> {
        let token = generate_token(&user, &self.config)?;
        Ok(AuthSession {
            user: user.into(),
            token,
        })
    }

    async fn user_by_email(&self, email: &str) -> AppResult<User> {
        self.uow
            .users()
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_not_found("User")
    }

    async fn clear_challenge(&self, user_id: Uuid) -> AppResult<()> {
        self.uow.users().set_reset_challenge(user_id, None).await
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: NewUser) -> AppResult<AuthSession> {
        let email = normalize_email(&input.email);
        let users = self.uow.users();

        if users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&input.password)?.into_string();
        let phone = input
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let user = User::new(input.name.trim().to_string(), Some(email), phone, password_hash)
            .with_role(input.role);

        let created = if input.role.is_admin() {
            let _slot = self.locks.acquire(LOCK_ADMIN_SLOT).await?;
            ensure_admin_slot_free(users.as_ref()).await?;
            users.create(user).await?
        } else {
            users.create(user).await?
        };

        tracing::info!(user_id = %created.id, role = %created.role, "User registered");
        self.session(created)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let user = self
            .uow
            .users()
            .find_by_email(&normalize_email(&email))
            .await?;

        // Verify even for unknown emails so response time does not leak them
        let stored = Password::from_hash(
            user.as_ref()
                .map(|u| u.password_hash.clone())
                .unwrap_or_else(|| DUMMY_HASH.clone()),
        );
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if password_valid => self.session(user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn phone_login(
        &self,
        phone: String,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<AuthSession> {
        let phone = phone.trim().to_string();
        if phone.is_empty() {
            return Err(AppError::validation("Phone number is required"));
        }

        let users = self.uow.users();
        if let Some(existing) = users.find_by_phone(&phone).await? {
            return self.session(existing);
        }

        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "User".to_string());
        let email = email.map(|e| normalize_email(&e)).filter(|e| !e.is_empty());
        let password_hash = Password::random()?.into_string();

        let created = users
            .create(User::new(name, email, Some(phone), password_hash).with_role(UserRole::Customer))
            .await?;

        tracing::info!(user_id = %created.id, "Account created through phone login");
        self.session(created)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn send_reset_code(&self, email: String) -> AppResult<ResetCodeIssued> {
        let user = self.user_by_email(&email).await?;
        let challenge = ResetChallenge::issue(Utc::now());

        self.uow
            .users()
            .set_reset_challenge(user.id, Some(challenge.clone()))
            .await?;

        let to = user.email.clone().unwrap_or_default();
        let queued = self
            .notifier
            .send_email(templates::reset_code_email(&to, &user.name, &challenge.code))
            .await;

        if let Err(e) = queued {
            tracing::warn!(user_id = %user.id, error = %e, "Reset code email not queued");
            if !self.config.is_development() {
                return Err(AppError::internal(
                    "OTP generated but failed to send email. Please try again.",
                ));
            }
        }

        Ok(ResetCodeIssued {
            message: "OTP sent to your email. Check your inbox.".to_string(),
            test_otp: self.config.is_development().then_some(challenge.code),
        })
    }

    async fn verify_reset_code(&self, email: String, code: String) -> AppResult<()> {
        let user = self.user_by_email(&email).await?;
        let challenge = user
            .reset_challenge
            .clone()
            .ok_or_else(|| AppError::invalid_state(RESET_CODE_MISSING))?;

        match challenge.judge(&code, Utc::now()) {
            ResetVerdict::Accepted => Ok(()),
            ResetVerdict::Expired => {
                self.clear_challenge(user.id).await?;
                Err(AppError::invalid_state(RESET_CODE_EXPIRED))
            }
            ResetVerdict::AttemptsExhausted => {
                self.clear_challenge(user.id).await?;
                Err(AppError::TooManyAttempts(RESET_CODE_EXHAUSTED.to_string()))
            }
            ResetVerdict::Mismatch { remaining } => {
                self.uow
                    .users()
                    .set_reset_challenge(user.id, Some(challenge.with_failed_attempt()))
                    .await?;
                Err(AppError::invalid_state(format!(
                    "Invalid OTP. {} attempts remaining.",
                    remaining
                )))
            }
        }
    }

    async fn reset_password(
        &self,
        email: String,
        code: String,
        new_password: String,
    ) -> AppResult<()> {
        let password_hash = Password::new(&new_password)?.into_string();
        let user = self.user_by_email(&email).await?;
        let challenge = user
            .reset_challenge
            .as_ref()
            .ok_or_else(|| AppError::invalid_state(RESET_CODE_MISSING))?;

        match challenge.judge(&code, Utc::now()) {
            ResetVerdict::Accepted => {}
            ResetVerdict::Expired => {
                self.clear_challenge(user.id).await?;
                return Err(AppError::invalid_state(RESET_CODE_EXPIRED));
            }
            ResetVerdict::AttemptsExhausted => {
                self.clear_challenge(user.id).await?;
                return Err(AppError::TooManyAttempts(RESET_CODE_EXHAUSTED.to_string()));
            }
            ResetVerdict::Mismatch { .. } => return Err(AppError::invalid_state("Invalid OTP")),
        }

        self.uow.users().set_password(user.id, password_hash).await?;
        tracing::info!(user_id = %user.id, "Password reset");

        if let Some(to) = &user.email {
            email_best_effort(
                self.notifier.as_ref(),
                templates::password_changed_email(to, &user.name),
            )
            .await;
        }
        Ok(())
    }
}
