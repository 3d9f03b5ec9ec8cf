//! Cart line repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::cart_item::{self, ActiveModel, Entity as CartItemEntity};
use super::entities::product::Entity as ProductEntity;
use crate::domain::{normalize_color, CartLine, Product};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart line persistence
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The user's lines joined with their products, oldest first
    async fn lines_with_products(&self, user_id: Uuid)
        -> AppResult<Vec<(CartLine, Option<Product>)>>;

    /// The user's bare lines, oldest first
    async fn lines(&self, user_id: Uuid) -> AppResult<Vec<CartLine>>;

    async fn insert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        selected_color: Option<String>,
    ) -> AppResult<CartLine>;

    async fn set_quantity(&self, line_id: Uuid, quantity: i32) -> AppResult<()>;

    async fn delete_line(&self, line_id: Uuid) -> AppResult<()>;

    /// Remove every line; returns how many were removed
    async fn clear(&self, user_id: Uuid) -> AppResult<u64>;
}

/// SeaORM-backed cart store
pub struct CartStore {
    db: DatabaseConnection,
}

impl CartStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartRepository for CartStore {
    async fn lines_with_products(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(CartLine, Option<Product>)>> {
        let rows = CartItemEntity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .find_also_related(ProductEntity)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|(line, product)| (CartLine::from(line), product.map(Product::from)))
            .collect())
    }

    async fn lines(&self, user_id: Uuid) -> AppResult<Vec<CartLine>> {
        let models = CartItemEntity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(CartLine::from).collect())
    }

    async fn insert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        selected_color: Option<String>,
    ) -> AppResult<CartLine> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            selected_color: Set(normalize_color(selected_color.as_deref())),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(CartLine::from(model))
    }

    async fn set_quantity(&self, line_id: Uuid, quantity: i32) -> AppResult<()> {
        let result = CartItemEntity::update_many()
            .col_expr(cart_item::Column::Quantity, Expr::value(quantity))
            .filter(cart_item::Column::Id.eq(line_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Cart item"));
        }
        Ok(())
    }

    async fn delete_line(&self, line_id: Uuid) -> AppResult<()> {
        let result = CartItemEntity::delete_by_id(line_id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Cart item"));
        }
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<u64> {
        let result = CartItemEntity::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}
