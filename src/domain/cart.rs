//! Shopping cart lines and the assembled cart view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Product;

/// Treat blank color selections as "no color".
pub fn normalize_color(color: Option<&str>) -> Option<String> {
    color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Persisted cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub selected_color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// Lines are keyed by (product, color); no color only matches no color.
    pub fn matches(&self, product_id: Uuid, color: Option<&str>) -> bool {
        self.product_id == product_id
            && normalize_color(self.selected_color.as_deref()) == normalize_color(color)
    }
}

/// Cart line joined with its product
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub selected_color: Option<String>,
    /// Missing when the product was removed from the catalog
    pub product: Option<Product>,
}

impl CartItem {
    pub fn new(line: CartLine, product: Option<Product>) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            selected_color: line.selected_color,
            product,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.product
            .as_ref()
            .map(|p| p.price * Decimal::from(self.quantity))
            .unwrap_or_default()
    }
}

/// A user's cart
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    pub item_count: i32,
}

impl Cart {
    pub fn new(user_id: Uuid, items: Vec<CartItem>) -> Self {
        let subtotal = items.iter().map(CartItem::line_total).sum();
        let item_count = items.iter().map(|i| i.quantity).sum();
        Self {
            user_id,
            items,
            subtotal,
            item_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(color: Option<&str>) -> CartLine {
        CartLine {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id: Uuid::nil(),
            quantity: 1,
            selected_color: color.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_colorless_lines_match_each_other() {
        assert!(line(None).matches(Uuid::nil(), None));
        assert!(line(Some("")).matches(Uuid::nil(), None));
        assert!(line(None).matches(Uuid::nil(), Some("  ")));
    }

    #[test]
    fn test_color_is_part_of_the_key() {
        assert!(line(Some("red")).matches(Uuid::nil(), Some("red")));
        assert!(!line(Some("red")).matches(Uuid::nil(), Some("blue")));
        assert!(!line(Some("red")).matches(Uuid::nil(), None));
        assert!(!line(None).matches(Uuid::new_v4(), None));
    }

    #[test]
    fn test_subtotal_skips_missing_products() {
        let cart = Cart::new(Uuid::nil(), vec![CartItem::new(line(None), None)]);
        assert_eq!(cart.subtotal, Decimal::ZERO);
        assert_eq!(cart.item_count, 1);
    }
}
