//! Catalog product and its input/query types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Product as sold in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Cotton Kurta")]
    pub name: String,
    #[schema(example = "apparel")]
    pub category: String,
    #[schema(value_type = String, example = "499.00")]
    pub price: Decimal,
    #[schema(example = 12)]
    pub stock: i32,
    pub description: Option<String>,
    /// Primary image reference
    pub image: String,
    /// Gallery image references
    pub images: Vec<String>,
    /// Available color variants
    pub colors: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn has_stock_for(&self, quantity: i32) -> bool {
        quantity <= self.stock
    }
}

pub(crate) fn non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("Amount cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Product creation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Cotton Kurta")]
    pub name: String,
    #[validate(length(min = 1, message = "Category is required"))]
    #[schema(example = "apparel")]
    pub category: String,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = String, example = "499.00")]
    pub price: Decimal,
    /// Defaults to 0 when absent
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Product image is required"))]
    #[serde(alias = "imageUrl", alias = "image_url")]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl NewProduct {
    /// Trim text fields and drop empty list entries.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            price: self.price,
            stock: Some(self.stock.unwrap_or(0).max(0)),
            description: trimmed(self.description),
            image: self.image.trim().to_string(),
            images: clean_list(self.images),
            colors: clean_list(self.colors),
        }
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Partial product update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
    #[validate(custom(function = "non_negative_decimal"))]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub description: Option<String>,
    #[serde(alias = "imageUrl", alias = "image_url")]
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
}

impl ProductChanges {
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            category: trimmed(self.category),
            price: self.price,
            stock: self.stock.map(|s| s.max(0)),
            description: self.description.map(|d| d.trim().to_string()),
            image: trimmed(self.image),
            images: self.images.map(clean_list),
            colors: self.colors.map(clean_list),
        }
    }
}

/// Catalog ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
}

/// Catalog listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub category: Option<String>,
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    #[serde(alias = "min_price")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[serde(alias = "max_price")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    pub sort: Option<ProductSort>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ProductQuery {
    /// Empty filter strings and the catch-all category count as absent.
    pub fn normalized(self) -> Self {
        Self {
            category: trimmed(self.category).filter(|c| !c.eq_ignore_ascii_case("all")),
            search: trimmed(self.search),
            ..self
        }
    }
}
