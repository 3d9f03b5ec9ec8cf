//! Coupon repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::coupon::{self, ActiveModel, Entity as CouponEntity};
use crate::domain::{Coupon, CouponInput};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Lookup by upper-cased code
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Coupon>>;

    async fn list(&self) -> AppResult<Vec<Coupon>>;

    /// Duplicate codes are reported as `Conflict`
    async fn create(&self, input: CouponInput) -> AppResult<Coupon>;

    async fn update(&self, id: Uuid, input: CouponInput) -> AppResult<Coupon>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// `current_uses = current_uses + 1` in a single statement.
    /// Returns false when no coupon has this code.
    async fn increment_usage(&self, code: &str) -> AppResult<bool>;
}

/// SeaORM-backed coupon store
pub struct CouponStore {
    db: DatabaseConnection,
}

impl CouponStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CouponRepository for CouponStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        let result = CouponEntity::find()
            .filter(coupon::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Coupon::from))
    }

    async fn list(&self) -> AppResult<Vec<Coupon>> {
        let models = CouponEntity::find()
            .order_by_desc(coupon::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Coupon::from).collect())
    }

    async fn create(&self, input: CouponInput) -> AppResult<Coupon> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            discount_percent: Set(input.discount_percent),
            expiry_date: Set(input.expires_at),
            max_uses: Set(input.max_uses),
            current_uses: Set(0),
            min_order_amount: Set(input.min_order_amount),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_db_unique(e, "Coupon code"))?;
        Ok(Coupon::from(model))
    }

    async fn update(&self, id: Uuid, input: CouponInput) -> AppResult<Coupon> {
        let existing = CouponEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Coupon")?;

        let mut active: ActiveModel = existing.into();
        active.code = Set(input.code);
        active.discount_percent = Set(input.discount_percent);
        active.expiry_date = Set(input.expires_at);
        active.max_uses = Set(input.max_uses);
        active.min_order_amount = Set(input.min_order_amount);
        active.description = Set(input.description);
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::from_db_unique(e, "Coupon code"))?;
        Ok(Coupon::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CouponEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Coupon"));
        }
        Ok(())
    }

    async fn increment_usage(&self, code: &str) -> AppResult<bool> {
        let result = CouponEntity::update_many()
            .col_expr(
                coupon::Column::CurrentUses,
                Expr::col(coupon::Column::CurrentUses).add(1),
            )
            .col_expr(coupon::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coupon::Column::Code.eq(code))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
