//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Redis (rate limits and distributed locks)
//! - Health probes for both backends
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod health;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, HeldLock, LockGuard, LockPolicy, RateLimiter, ResourceLock};
pub use db::{Database, Migrator};
pub use health::{HealthProbe, Infrastructure};
pub use repositories::{
    CartRepository, CartStore, CouponRepository, CouponStore, OrderRepository, OrderStore,
    ProductRepository, ProductStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, SeaTransaction, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::{MockRateLimiter, MockResourceLock};
#[cfg(any(test, feature = "test-utils"))]
pub use health::MockHealthProbe;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockCartRepository, MockCouponRepository, MockOrderRepository, MockProductRepository,
    MockUserRepository,
};
