//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database, HealthProbe, Infrastructure, Persistence, RateLimiter};
use crate::services::{
    AuthService, CartService, CouponService, Notifier, OrderService, ProductService,
    ServiceContainer, Services, UserService,
};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    services: Arc<dyn ServiceContainer>,
    /// Request counters for the rate-limit middleware
    pub limiter: Arc<dyn RateLimiter>,
    /// Backends reported by `/health`
    pub probes: Arc<dyn HealthProbe>,
}

impl AppState {
    /// Wire the production services over PostgreSQL and Redis.
    pub fn from_config(
        database: Database,
        cache: Cache,
        notifier: Arc<dyn Notifier>,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(database.get_connection()));
        let cache = Arc::new(cache);
        let services = Services::new(uow, config, notifier, cache.clone());

        Self {
            services: Arc::new(services),
            limiter: cache.clone(),
            probes: Arc::new(Infrastructure::new(database, cache.as_ref().clone())),
        }
    }

    /// Create state from already-built parts.
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        limiter: Arc<dyn RateLimiter>,
        probes: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            services,
            limiter,
            probes,
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.services.auth()
    }

    pub fn users(&self) -> Arc<dyn UserService> {
        self.services.users()
    }

    pub fn products(&self) -> Arc<dyn ProductService> {
        self.services.products()
    }

    pub fn carts(&self) -> Arc<dyn CartService> {
        self.services.carts()
    }

    pub fn orders(&self) -> Arc<dyn OrderService> {
        self.services.orders()
    }

    pub fn coupons(&self) -> Arc<dyn CouponService> {
        self.services.coupons()
    }
}
