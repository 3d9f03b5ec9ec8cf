//! Order database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Address, Order, OrderStatus, TrackingUpdate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_amount: Decimal,
    pub status: String,
    /// Address snapshot taken at checkout
    pub shipping_address: Json,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub shipping_cost: Option<Decimal>,
    pub coupon_code: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub discount_amount: Option<Decimal>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub current_location: Option<String>,
    pub estimated_delivery: Option<DateTimeUtc>,
    pub tracking_updates: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        let status = model.status.parse().unwrap_or_else(|_| {
            tracing::warn!(order_id = %model.id, status = %model.status, "Unknown stored order status");
            OrderStatus::Pending
        });

        Order {
            id: model.id,
            user_id: model.user_id,
            total_amount: model.total_amount,
            status,
            shipping_address: serde_json::from_value::<Address>(model.shipping_address)
                .unwrap_or_default(),
            shipping_cost: model.shipping_cost,
            coupon_code: model.coupon_code,
            discount_amount: model.discount_amount,
            tracking_number: model.tracking_number,
            carrier: model.carrier,
            current_location: model.current_location,
            estimated_delivery: model.estimated_delivery,
            tracking_updates: model
                .tracking_updates
                .and_then(|v| serde_json::from_value::<Vec<TrackingUpdate>>(v).ok())
                .unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
