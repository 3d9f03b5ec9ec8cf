//! Cart service - per-user shopping carts.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{normalize_color, Cart, CartItem, CartLine};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Cart service trait for dependency injection.
#[async_trait]
pub trait CartService: Send + Sync {
    async fn get_cart(&self, user_id: Uuid) -> AppResult<Cart>;

    /// Add a product; a line with the same product and color grows instead
    async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        color: Option<String>,
    ) -> AppResult<Cart>;

    /// Set a line's quantity; zero or less removes the line
    async fn update_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        color: Option<String>,
    ) -> AppResult<Cart>;

    async fn remove_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        color: Option<String>,
    ) -> AppResult<Cart>;

    async fn clear(&self, user_id: Uuid) -> AppResult<Cart>;
}

/// Concrete implementation of CartService using Unit of Work.
pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Line for (product, color). Without a color, any line of the product.
    async fn locate(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        color: Option<&str>,
    ) -> AppResult<CartLine> {
        let lines = self.uow.carts().lines(user_id).await?;
        let color = normalize_color(color);

        let found = match color.as_deref() {
            Some(color) => lines
                .into_iter()
                .find(|line| line.matches(product_id, Some(color))),
            None => lines.into_iter().find(|line| line.product_id == product_id),
        };
        found.ok_or_not_found("Cart item")
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn get_cart(&self, user_id: Uuid) -> AppResult<Cart> {
        let rows = self.uow.carts().lines_with_products(user_id).await?;
        let items = rows
            .into_iter()
            .map(|(line, product)| CartItem::new(line, product))
            .collect();
        Ok(Cart::new(user_id, items))
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        color: Option<String>,
    ) -> AppResult<Cart> {
        if quantity < 1 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }

        self.uow
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or_not_found("Product")?;

        let carts = self.uow.carts();
        let color = normalize_color(color.as_deref());
        let existing = carts
            .lines(user_id)
            .await?
            .into_iter()
            .find(|line| line.matches(product_id, color.as_deref()));

        match existing {
            Some(line) => {
                carts
                    .set_quantity(line.id, line.quantity.saturating_add(quantity))
                    .await?
            }
            None => {
                carts.insert(user_id, product_id, quantity, color).await?;
            }
        }

        self.get_cart(user_id).await
    }

    async fn update_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        color: Option<String>,
    ) -> AppResult<Cart> {
        let line = self.locate(user_id, product_id, color.as_deref()).await?;

        if quantity <= 0 {
            self.uow.carts().delete_line(line.id).await?;
        } else {
            self.uow.carts().set_quantity(line.id, quantity).await?;
        }

        self.get_cart(user_id).await
    }

    async fn remove_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        color: Option<String>,
    ) -> AppResult<Cart> {
        let line = self.locate(user_id, product_id, color.as_deref()).await?;
        self.uow.carts().delete_line(line.id).await?;
        self.get_cart(user_id).await
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<Cart> {
        let removed = self.uow.carts().clear(user_id).await?;
        tracing::debug!(user_id = %user_id, removed, "Cart cleared");
        Ok(Cart::new(user_id, Vec::new()))
    }
}
