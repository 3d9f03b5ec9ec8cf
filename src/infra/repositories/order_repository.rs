//! Order repository implementation (reads; writes go through a transaction).

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::order::{self, Entity as OrderEntity};
use super::entities::order_item::{self, Entity as OrderItemEntity};
use super::entities::product::Entity as ProductEntity;
use super::entities::user::Entity as UserEntity;
use crate::domain::{Order, OrderLine, Product, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// A customer's orders, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>>;

    /// Every order with its buyer, newest first
    async fn list_all(&self) -> AppResult<Vec<(Order, Option<User>)>>;

    /// Lines of the given orders joined with their products
    async fn lines_with_products(
        &self,
        order_ids: Vec<Uuid>,
    ) -> AppResult<Vec<(OrderLine, Option<Product>)>>;
}

/// SeaORM-backed order store
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let result = OrderEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Order::from))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        let models = OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Order::from).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<(Order, Option<User>)>> {
        let rows = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|(order, user)| (Order::from(order), user.map(User::from)))
            .collect())
    }

    async fn lines_with_products(
        &self,
        order_ids: Vec<Uuid>,
    ) -> AppResult<Vec<(OrderLine, Option<Product>)>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .find_also_related(ProductEntity)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|(line, product)| (OrderLine::from(line), product.map(Product::from)))
            .collect())
    }
}
