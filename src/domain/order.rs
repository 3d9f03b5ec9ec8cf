//! Orders, their lifecycle states and tracking data.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{Address, Product, User};
use crate::config::{
    DEFAULT_CARRIER, DEFAULT_DELIVERY_DAYS, DEFAULT_LOCATION, TRACKING_DIGITS, TRACKING_PREFIX,
};
use crate::errors::AppError;

/// Order lifecycle state.
///
/// Parsed case-insensitively; unknown names are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[schema(rename_all = "kebab-case", example = "pending")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    OutForDelivery,
    Delivered,
    ReturnRequested,
    Returned,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::ReturnRequested,
        OrderStatus::Returned,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::OutForDelivery => "out-for-delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::ReturnRequested => "return-requested",
            OrderStatus::Returned => "returned",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Customers may cancel until the parcel leaves the warehouse.
    pub fn customer_can_cancel(&self) -> bool {
        !matches!(
            self,
            OrderStatus::Shipped | OrderStatus::OutForDelivery | OrderStatus::Delivered
        )
    }

    /// Moving from `self` to `next` puts reserved stock back on the shelf.
    pub fn restores_stock_to(&self, next: OrderStatus) -> bool {
        next == OrderStatus::Cancelled && *self != OrderStatus::Cancelled
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::validation(format!("Invalid order status: {}", wanted)))
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One entry of the shipment history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrackingUpdate {
    pub status: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Stored order row
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Address,
    pub shipping_cost: Option<Decimal>,
    pub coupon_code: Option<String>,
    pub discount_amount: Option<Decimal>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub current_location: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub tracking_updates: Vec<TrackingUpdate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable line of a placed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price when the order was placed
    pub price: Decimal,
    pub selected_color: Option<String>,
}

/// Tracking data as shown to customers, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    #[schema(example = "TRACK1A2B3C4D")]
    pub tracking_number: String,
    pub carrier: String,
    pub current_location: String,
    pub estimated_delivery: DateTime<Utc>,
    pub tracking_updates: Vec<TrackingUpdate>,
}

/// Deterministic tracking number for an order without a stored one.
pub fn tracking_number_for(order_id: Uuid) -> String {
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, order_id.as_bytes());
    let hex = digest.simple().to_string().to_uppercase();
    format!("{}{}", TRACKING_PREFIX, &hex[..TRACKING_DIGITS])
}

impl Tracking {
    /// Stored values win; anything missing is synthesized.
    pub fn for_order(order: &Order) -> Self {
        let tracking_updates = if order.tracking_updates.is_empty() {
            vec![TrackingUpdate {
                status: "Order Confirmed".to_string(),
                location: "Warehouse".to_string(),
                timestamp: order.created_at,
                message: "Your order has been confirmed".to_string(),
            }]
        } else {
            order.tracking_updates.clone()
        };

        Self {
            tracking_number: order
                .tracking_number
                .clone()
                .unwrap_or_else(|| tracking_number_for(order.id)),
            carrier: order
                .carrier
                .clone()
                .unwrap_or_else(|| DEFAULT_CARRIER.to_string()),
            current_location: order
                .current_location
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            estimated_delivery: order
                .estimated_delivery
                .unwrap_or(order.created_at + Duration::days(DEFAULT_DELIVERY_DAYS)),
            tracking_updates,
        }
    }
}

/// Line of a checkout request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    #[serde(alias = "product_id")]
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Accepted for compatibility; the current catalog price is always used
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[serde(default, alias = "selected_color", alias = "color")]
    pub selected_color: Option<String>,
}

/// Checkout request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[serde(alias = "shipping_address")]
    pub shipping_address: Address,
    /// Falls back to the caller's cart when empty
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<OrderItemInput>,
    #[serde(default, alias = "total_amount")]
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    #[serde(default, alias = "shipping_cost")]
    #[schema(value_type = Option<String>)]
    pub shipping_cost: Option<Decimal>,
    #[serde(default, alias = "coupon_code")]
    pub coupon_code: Option<String>,
    #[serde(default, alias = "discount_amount")]
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
}

/// Product line resolved for checkout, either from the request or the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub selected_color: Option<String>,
}

/// Order header inserted at checkout
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub shipping_cost: Option<Decimal>,
    pub coupon_code: Option<String>,
    pub discount_amount: Option<Decimal>,
}

/// Buyer details shown on the admin order list
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&User> for CustomerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

/// Order line with the product it refers to
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub selected_color: Option<String>,
    pub product: Option<Product>,
}

/// Order as returned by the API, enriched with tracking data
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub shipping_address: Address,
    #[schema(value_type = Option<String>)]
    pub shipping_cost: Option<Decimal>,
    pub coupon_code: Option<String>,
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
    pub items: Vec<OrderItemView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSummary>,
    #[serde(flatten)]
    pub tracking: Tracking,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderDetails {
    pub fn assemble(
        order: Order,
        lines: Vec<(OrderLine, Option<Product>)>,
        customer: Option<CustomerSummary>,
    ) -> Self {
        let tracking = Tracking::for_order(&order);
        let items = lines
            .into_iter()
            .map(|(line, product)| OrderItemView {
                id: line.id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
                selected_color: line.selected_color,
                product,
            })
            .collect();

        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            shipping_cost: order.shipping_cost,
            coupon_code: order.coupon_code,
            discount_amount: order.discount_amount,
            items,
            customer,
            tracking,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Customer-facing tracking page
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub order_id: Uuid,
    pub status: OrderStatus,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub item_count: i32,
    #[serde(flatten)]
    pub tracking: Tracking,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderDetails> for TrackingView {
    fn from(details: &OrderDetails) -> Self {
        Self {
            order_id: details.id,
            status: details.status,
            total_amount: details.total_amount,
            shipping_address: details.shipping_address.clone(),
            item_count: details.items.iter().map(|i| i.quantity).sum(),
            tracking: details.tracking.clone(),
            created_at: details.created_at,
        }
    }
}
