//! Discount coupons.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::product::non_negative_decimal;
use crate::config::MAX_DISCOUNT_PERCENT;
use crate::errors::{AppError, AppResult};

/// Upper-case and trim a coupon code.
pub fn normalize_code(code: &str) -> AppResult<String> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::validation("Coupon code is required"));
    }
    Ok(code)
}

/// Stored coupon
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    #[schema(example = "SAVE10")]
    pub code: String,
    #[schema(value_type = String, example = "10")]
    pub discount_percent: Decimal,
    pub expires_at: DateTime<Utc>,
    /// Unlimited when absent
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    #[schema(value_type = Option<String>)]
    pub min_order_amount: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Discount computed for a given order total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    pub coupon_id: Uuid,
    pub code: String,
    #[schema(value_type = String)]
    pub discount_percent: Decimal,
    #[schema(value_type = String, example = "100.00")]
    pub discount_amount: Decimal,
    #[schema(value_type = String, example = "900.00")]
    pub final_total: Decimal,
}

impl Coupon {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses
            .map(|ceiling| self.current_uses >= ceiling)
            .unwrap_or(false)
    }

    /// Reject the coupon for this total, or quote the discount.
    pub fn quote(&self, order_total: Decimal, now: DateTime<Utc>) -> AppResult<CouponQuote> {
        if self.is_expired(now) {
            return Err(AppError::invalid_state("Coupon has expired"));
        }
        if self.is_exhausted() {
            return Err(AppError::invalid_state("Coupon has reached maximum uses"));
        }
        if let Some(minimum) = self.min_order_amount {
            if order_total < minimum {
                return Err(AppError::invalid_state(format!(
                    "Minimum order amount for this coupon is {}",
                    minimum
                )));
            }
        }

        let discount_amount = (order_total * self.discount_percent / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Ok(CouponQuote {
            coupon_id: self.id,
            code: self.code.clone(),
            discount_percent: self.discount_percent,
            discount_amount,
            final_total: order_total - discount_amount,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiryInput {
    Instant(DateTime<Utc>),
    Day(NaiveDate),
}

/// Accept either an RFC 3339 instant or a bare date (midnight UTC).
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ExpiryInput::deserialize(deserializer)? {
        ExpiryInput::Instant(at) => at,
        ExpiryInput::Day(day) => day.and_time(NaiveTime::MIN).and_utc(),
    })
}

fn percent_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::from(MAX_DISCOUNT_PERCENT) {
        let mut err = ValidationError::new("percent");
        err.message = Some("Discount percent must be between 0 and 100".into());
        return Err(err);
    }
    Ok(())
}

/// Coupon create/update payload.
///
/// Field names are accepted in the admin console's camelCase and the
/// storage snake_case spelling.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CouponInput {
    #[validate(length(min = 1, message = "Coupon code is required"))]
    #[schema(example = "SAVE10")]
    pub code: String,
    #[serde(alias = "discountPercent")]
    #[validate(custom(function = "percent_in_range"))]
    #[schema(value_type = String, example = "10")]
    pub discount_percent: Decimal,
    #[serde(
        rename = "expiry_date",
        alias = "expiryDate",
        alias = "expiresAt",
        alias = "expires_at",
        deserialize_with = "deserialize_expiry"
    )]
    #[schema(value_type = String, example = "2030-12-31")]
    pub expires_at: DateTime<Utc>,
    #[serde(default, alias = "maxUsageCount", alias = "maxUses")]
    #[validate(range(min = 0, message = "Usage limit cannot be negative"))]
    pub max_uses: Option<i32>,
    #[serde(default, alias = "minOrderAmount")]
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = Option<String>)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CouponInput {
    /// Canonical form: upper-cased code, trimmed description, and a usage
    /// limit of zero read as no limit.
    pub fn normalized(self) -> AppResult<Self> {
        Ok(Self {
            code: normalize_code(&self.code)?,
            max_uses: self.max_uses.filter(|&ceiling| ceiling > 0),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            ..self
        })
    }
}
