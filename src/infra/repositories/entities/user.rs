//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Address, ResetChallenge, User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: Option<String>,
    #[sea_orm(unique)]
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    /// Postal address as JSON (street, city, state, zipCode, country)
    pub address: Option<Json>,
    /// Outstanding reset code as JSON (code, expires_at, attempts)
    pub reset_otp: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            password_hash: model.password_hash,
            role: UserRole::from(model.role.as_str()),
            address: model
                .address
                .and_then(|v| serde_json::from_value::<Address>(v).ok()),
            reset_challenge: model
                .reset_otp
                .and_then(|v| serde_json::from_value::<ResetChallenge>(v).ok()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
