//! Domain layer - Core business entities and logic
//!
//! Storefront entities and the pure rules that govern them: coupon
//! quoting, cart line matching, order status and tracking synthesis.

pub mod cart;
pub mod coupon;
pub mod order;
pub mod password;
pub mod product;
pub mod user;

pub use cart::{normalize_color, Cart, CartItem, CartLine};
pub use coupon::{normalize_code, Coupon, CouponInput, CouponQuote};
pub use order::{
    tracking_number_for, CreateOrder, CustomerSummary, NewOrder, Order, OrderDetails,
    OrderItemInput, OrderItemView, OrderLine, OrderStatus, RequestedLine, Tracking,
    TrackingUpdate, TrackingView,
};
pub use password::Password;
pub use product::{NewProduct, Product, ProductChanges, ProductQuery, ProductSort};
pub use user::{
    Address, NewUser, ProfileChanges, ResetChallenge, ResetVerdict, User, UserResponse, UserRole,
};
