//! Coupon service - discount validation and admin maintenance.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{normalize_code, Coupon, CouponInput, CouponQuote};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Coupon service trait for dependency injection.
#[async_trait]
pub trait CouponService: Send + Sync {
    /// Quote the discount for an order total. Does not consume a use.
    async fn validate(&self, code: String, order_total: Decimal) -> AppResult<CouponQuote>;

    async fn create(&self, input: CouponInput) -> AppResult<Coupon>;

    async fn list(&self) -> AppResult<Vec<Coupon>>;

    async fn update(&self, id: Uuid, input: CouponInput) -> AppResult<Coupon>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CouponService using Unit of Work.
pub struct CouponDesk<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CouponDesk<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CouponService for CouponDesk<U> {
    async fn validate(&self, code: String, order_total: Decimal) -> AppResult<CouponQuote> {
        let code = normalize_code(&code)?;
        if order_total.is_sign_negative() && !order_total.is_zero() {
            return Err(AppError::validation("Order total cannot be negative"));
        }

        let coupon = self
            .uow
            .coupons()
            .find_by_code(&code)
            .await?
            .ok_or_not_found("Coupon")?;

        coupon.quote(order_total, Utc::now())
    }

    async fn create(&self, input: CouponInput) -> AppResult<Coupon> {
        let coupon = self.uow.coupons().create(input.normalized()?).await?;
        tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    async fn list(&self) -> AppResult<Vec<Coupon>> {
        self.uow.coupons().list().await
    }

    async fn update(&self, id: Uuid, input: CouponInput) -> AppResult<Coupon> {
        self.uow.coupons().update(id, input.normalized()?).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.uow.coupons().delete(id).await?;
        tracing::info!(coupon_id = %id, "Coupon deleted");
        Ok(())
    }
}
