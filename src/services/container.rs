//! Service Container - Centralized service access.
//!
//! Handlers reach every use case through [`ServiceContainer`], which
//! hands out trait objects so tests can swap in mocks.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, CartManager, CartService, Catalog, CouponDesk, CouponService,
    Notifier, OrderDesk, OrderService, ProductService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{ResourceLock, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn products(&self) -> Arc<dyn ProductService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn coupons(&self) -> Arc<dyn CouponService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    product_service: Arc<dyn ProductService>,
    cart_service: Arc<dyn CartService>,
    order_service: Arc<dyn OrderService>,
    coupon_service: Arc<dyn CouponService>,
}

impl Services {
    /// Wire every service over one unit of work.
    pub fn new<U: UnitOfWork + 'static>(
        uow: Arc<U>,
        config: Config,
        notifier: Arc<dyn Notifier>,
        locks: Arc<dyn ResourceLock>,
    ) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(
                uow.clone(),
                config,
                notifier.clone(),
                locks.clone(),
            )),
            user_service: Arc::new(UserManager::new(uow.clone(), locks)),
            product_service: Arc::new(Catalog::new(uow.clone())),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            order_service: Arc::new(OrderDesk::new(uow.clone(), notifier)),
            coupon_service: Arc::new(CouponDesk::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn coupons(&self) -> Arc<dyn CouponService> {
        self.coupon_service.clone()
    }
}
