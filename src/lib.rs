//! Retail storefront backend.
//!
//! A product catalog, per-user carts, checkout that reserves stock inside
//! one transaction, an order workflow that notifies customers by email and
//! SMS, and percentage coupons. At most one account may hold the admin role.
//!
//! Requests enter through [`api`], business rules live in [`services`] over
//! the [`domain`] types, and [`infra`] owns PostgreSQL and Redis. Email and
//! SMS are queued with apalis and delivered by a separate worker:
//!
//! ```bash
//! storefront migrate up
//! storefront serve --port 5000
//! storefront jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;
pub mod utils;

pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
