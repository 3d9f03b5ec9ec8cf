//! User service - profiles and admin account management.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::LOCK_ADMIN_SLOT;
use crate::domain::{ProfileChanges, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{ResourceLock, UnitOfWork, UserRepository};

pub(crate) const ADMIN_SLOT_TAKEN: &str = "Admin slot is already taken. Only one admin is allowed.";

/// Fail when some account already holds the admin role.
///
/// Callers hold the admin-slot lock while checking and writing.
pub(crate) async fn ensure_admin_slot_free(users: &dyn UserRepository) -> AppResult<()> {
    if users.find_admin().await?.is_some() {
        return Err(AppError::invalid_state(ADMIN_SLOT_TAKEN));
    }
    Ok(())
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User>;

    /// All accounts (admin)
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Delete an account with its orders and cart (admin)
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Promote the account with this email to admin (admin)
    async fn make_admin(&self, email: String) -> AppResult<User>;

    /// Whether the admin slot is taken
    async fn admin_exists(&self) -> AppResult<bool>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    locks: Arc<dyn ResourceLock>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, locks: Arc<dyn ResourceLock>) -> Self {
        Self { uow, locks }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User> {
        let changes = ProfileChanges {
            name: changes
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            phone: changes
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            address: changes.address,
        };
        self.uow.users().update_profile(id, changes).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let user = self.get_user(id).await?;

        // Only one admin can exist, so an admin is always the last one
        if user.is_admin() {
            return Err(AppError::invalid_state("Cannot delete the only admin."));
        }

        self.uow
            .transaction(move |tx| Box::pin(async move { tx.delete_user(id).await }))
            .await?;

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn make_admin(&self, email: String) -> AppResult<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }

        let users = self.uow.users();
        let user = users
            .find_by_email(&email)
            .await?
            .ok_or_not_found("User")?;

        if user.is_admin() {
            return Err(AppError::invalid_state("User is already an admin"));
        }

        let _slot = self.locks.acquire(LOCK_ADMIN_SLOT).await?;
        ensure_admin_slot_free(users.as_ref()).await?;
        let promoted = users.set_role(user.id, UserRole::Admin).await?;

        tracing::info!(user_id = %promoted.id, "User promoted to admin");
        Ok(promoted)
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        Ok(self.uow.users().find_admin().await?.is_some())
    }
}
