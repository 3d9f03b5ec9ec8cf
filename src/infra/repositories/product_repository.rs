//! Product repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use crate::domain::{NewProduct, Product, ProductChanges, ProductQuery, ProductSort};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Catalog persistence
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// One page of products matching the filters, plus the total match count
    async fn list(
        &self,
        query: ProductQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<Product>, u64)>;

    /// Name search, optionally restricted to a category
    async fn search(&self, term: String, category: Option<String>) -> AppResult<Vec<Product>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn create(&self, input: NewProduct) -> AppResult<Product>;

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;
}

/// SeaORM-backed product store
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Case-insensitive substring match on the product name.
fn name_contains(term: &str) -> Condition {
    let pattern = format!("%{}%", term.to_lowercase());
    Condition::all().add(
        Expr::expr(Func::lower(Expr::col((ProductEntity, product::Column::Name)))).like(pattern),
    )
}

fn filtered(query: &ProductQuery) -> Select<ProductEntity> {
    let mut select = ProductEntity::find();

    if let Some(category) = &query.category {
        select = select.filter(product::Column::Category.eq(category.as_str()));
    }
    if let Some(term) = &query.search {
        select = select.filter(name_contains(term));
    }
    if let Some(min) = query.min_price {
        select = select.filter(product::Column::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        select = select.filter(product::Column::Price.lte(max));
    }

    match query.sort.unwrap_or_default() {
        ProductSort::PriceAsc => select.order_by_asc(product::Column::Price),
        ProductSort::PriceDesc => select.order_by_desc(product::Column::Price),
        ProductSort::Newest => select.order_by_desc(product::Column::CreatedAt),
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(
        &self,
        query: ProductQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<Product>, u64)> {
        let paginator = filtered(&query).paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Product::from).collect(), total))
    }

    async fn search(&self, term: String, category: Option<String>) -> AppResult<Vec<Product>> {
        let query = ProductQuery {
            search: Some(term),
            category,
            ..Default::default()
        }
        .normalized();

        let models = filtered(&query)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Product::from))
    }

    async fn create(&self, input: NewProduct) -> AppResult<Product> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            category: Set(input.category),
            price: Set(input.price),
            stock: Set(input.stock.unwrap_or(0)),
            description: Set(input.description),
            image: Set(input.image),
            images: Set(input.images.into()),
            colors: Set(input.colors.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        let product = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Product")?;

        let mut active: ActiveModel = product.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(stock) = changes.stock {
            active.stock = Set(stock);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description).filter(|d| !d.is_empty()));
        }
        if let Some(image) = changes.image {
            active.image = Set(image);
        }
        if let Some(images) = changes.images {
            active.images = Set(images.into());
        }
        if let Some(colors) = changes.colors {
            active.colors = Set(colors.into());
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }
}
