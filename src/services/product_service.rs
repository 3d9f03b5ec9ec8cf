//! Catalog service - product browsing and admin maintenance.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{NewProduct, Product, ProductChanges, ProductQuery};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// Product service trait for dependency injection.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Filtered, sorted and paginated catalog listing
    async fn list(&self, query: ProductQuery) -> AppResult<Paginated<Product>>;

    /// Name search, optionally narrowed to a category
    async fn search(&self, term: String, category: Option<String>) -> AppResult<Vec<Product>>;

    async fn get(&self, id: Uuid) -> AppResult<Product>;

    async fn create(&self, input: NewProduct) -> AppResult<Product>;

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;

    /// Remove a product along with every cart and order line naming it
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ProductService using Unit of Work.
pub struct Catalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Catalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProductService for Catalog<U> {
    async fn list(&self, query: ProductQuery) -> AppResult<Paginated<Product>> {
        let query = query.normalized();
        let window = PaginationParams::clamped(query.page, query.limit);
        let (products, total) = self.uow.products().list(query, window).await?;
        Ok(Paginated::new(products, window, total))
    }

    async fn search(&self, term: String, category: Option<String>) -> AppResult<Vec<Product>> {
        let term = term.trim().to_string();
        if term.is_empty() {
            return Err(AppError::validation("Search query is required"));
        }
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

        self.uow.products().search(term, category).await
    }

    async fn get(&self, id: Uuid) -> AppResult<Product> {
        self.uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Product")
    }

    async fn create(&self, input: NewProduct) -> AppResult<Product> {
        let product = self.uow.products().create(input.normalized()).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        self.uow.products().update(id, changes.normalized()).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.uow
            .transaction(move |tx| Box::pin(async move { tx.delete_product(id).await }))
            .await?;

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
