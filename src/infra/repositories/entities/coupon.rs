//! Coupon database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Coupon;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount_percent: Decimal,
    pub expiry_date: DateTimeUtc,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub min_order_amount: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Coupon {
    fn from(model: Model) -> Self {
        Coupon {
            id: model.id,
            code: model.code,
            discount_percent: model.discount_percent,
            expires_at: model.expiry_date,
            max_uses: model.max_uses,
            current_uses: model.current_uses,
            min_order_amount: model.min_order_amount,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
