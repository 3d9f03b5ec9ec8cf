//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
mod cart_service;
pub mod container;
mod coupon_service;
mod notifier;
mod order_service;
mod product_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthService, AuthSession, Authenticator, Claims, ResetCodeIssued, TokenResponse,
};
pub use cart_service::{CartManager, CartService};
pub use coupon_service::{CouponDesk, CouponService};
pub use notifier::{Notifier, QueueNotifier};
pub use order_service::{OrderDesk, OrderService};
pub use product_service::{Catalog, ProductService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockNotifier;
