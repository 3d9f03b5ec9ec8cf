//! Unit of Work pattern implementation.
//!
//! Centralizes access to every repository and runs multi-row writes
//! (stock, orders, cascading deletes) inside one database transaction.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::{cart_item, order, order_item, product, user};
use super::repositories::{
    CartRepository, CartStore, CouponRepository, CouponStore, OrderRepository, OrderStore,
    ProductRepository, ProductStore, UserRepository, UserStore,
};
use crate::domain::{NewOrder, Order, OrderLine, OrderStatus, Product, RequestedLine};
use crate::errors::{AppError, AppResult, OptionExt};

/// Boxed future returned by a transaction body.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction methods;
/// tests provide an in-memory implementation instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn carts(&self) -> Arc<dyn CartRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn coupons(&self) -> Arc<dyn CouponRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn TransactionContext) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Writes that must share a transaction.
#[async_trait]
pub trait TransactionContext: Send + Sync {
    /// Read a product and hold its row lock until the transaction ends
    async fn lock_product(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn set_product_stock(&self, id: Uuid, stock: i32) -> AppResult<()>;

    /// Read an order and hold its row lock until the transaction ends
    async fn lock_order(&self, id: Uuid) -> AppResult<Option<Order>>;

    async fn insert_order(&self, order: NewOrder) -> AppResult<Order>;

    async fn insert_order_line(
        &self,
        order_id: Uuid,
        line: &RequestedLine,
        unit_price: Decimal,
    ) -> AppResult<OrderLine>;

    async fn order_lines(&self, order_id: Uuid) -> AppResult<Vec<OrderLine>>;

    async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order>;

    /// Remove an order and its lines
    async fn delete_order(&self, id: Uuid) -> AppResult<()>;

    /// Remove a product with the cart and order lines pointing at it
    async fn delete_product(&self, id: Uuid) -> AppResult<()>;

    /// Remove a user with their orders, order lines and cart
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Transaction context backed by a SeaORM transaction.
pub struct SeaTransaction<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> SeaTransaction<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    async fn delete_lines_of(&self, order_ids: Vec<Uuid>) -> AppResult<()> {
        if order_ids.is_empty() {
            return Ok(());
        }
        order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .exec(self.txn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<'a> TransactionContext for SeaTransaction<'a> {
    async fn lock_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let result = product::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Product::from))
    }

    async fn set_product_stock(&self, id: Uuid, stock: i32) -> AppResult<()> {
        product::Entity::update_many()
            .col_expr(product::Column::Stock, Expr::value(stock))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(id))
            .exec(self.txn)
            .await?;
        Ok(())
    }

    async fn lock_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        let result = order::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Order::from))
    }

    async fn insert_order(&self, new_order: NewOrder) -> AppResult<Order> {
        let now = Utc::now();
        let shipping_address = serde_json::to_value(&new_order.shipping_address)
            .map_err(|e| AppError::internal(e.to_string()))?;

        let active_model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_order.user_id),
            total_amount: Set(new_order.total_amount),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            shipping_address: Set(shipping_address),
            shipping_cost: Set(new_order.shipping_cost),
            coupon_code: Set(new_order.coupon_code),
            discount_amount: Set(new_order.discount_amount),
            tracking_number: Set(None),
            carrier: Set(None),
            current_location: Set(None),
            estimated_delivery: Set(None),
            tracking_updates: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(Order::from(model))
    }

    async fn insert_order_line(
        &self,
        order_id: Uuid,
        line: &RequestedLine,
        unit_price: Decimal,
    ) -> AppResult<OrderLine> {
        let active_model = order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(unit_price),
            selected_color: Set(line.selected_color.clone()),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(OrderLine::from(model))
    }

    async fn order_lines(&self, order_id: Uuid) -> AppResult<Vec<OrderLine>> {
        let models = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(OrderLine::from).collect())
    }

    async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let existing = order::Entity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_not_found("Order")?;

        let mut active: order::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(self.txn).await.map_err(AppError::from)?;
        Ok(Order::from(model))
    }

    async fn delete_order(&self, id: Uuid) -> AppResult<()> {
        self.delete_lines_of(vec![id]).await?;

        let result = order::Entity::delete_by_id(id)
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Order"));
        }
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::ProductId.eq(id))
            .exec(self.txn)
            .await?;
        order_item::Entity::delete_many()
            .filter(order_item::Column::ProductId.eq(id))
            .exec(self.txn)
            .await?;

        let result = product::Entity::delete_by_id(id)
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Product"));
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let order_ids: Vec<Uuid> = order::Entity::find()
            .select_only()
            .column(order::Column::Id)
            .filter(order::Column::UserId.eq(id))
            .into_tuple()
            .all(self.txn)
            .await?;

        self.delete_lines_of(order_ids).await?;
        order::Entity::delete_many()
            .filter(order::Column::UserId.eq(id))
            .exec(self.txn)
            .await?;
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(id))
            .exec(self.txn)
            .await?;

        let result = user::Entity::delete_by_id(id)
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    product_repo: Arc<ProductStore>,
    cart_repo: Arc<CartStore>,
    order_repo: Arc<OrderStore>,
    coupon_repo: Arc<CouponStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone())),
            cart_repo: Arc::new(CartStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            coupon_repo: Arc::new(CouponStore::new(db.clone())),
            db,
        }
    }

    /// Run `f` inside a transaction with the given isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn TransactionContext) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = SeaTransaction::new(&txn);
        let outcome = f(&ctx).await;

        match outcome {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.cart_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    fn coupons(&self) -> Arc<dyn CouponRepository> {
        self.coupon_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn TransactionContext) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }
}
