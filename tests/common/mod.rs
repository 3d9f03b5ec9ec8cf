//! Shared test doubles: an in-memory unit of work with transaction
//! rollback, a notifier that records jobs, and permissive Redis seams.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use storefront_api::config::Config;
use storefront_api::domain::{
    Address, CartLine, Coupon, CouponInput, NewOrder, NewProduct, Order, OrderLine, OrderStatus,
    Password, Product, ProductChanges, ProductQuery, ProductSort, ProfileChanges, RequestedLine,
    ResetChallenge, User, UserRole,
};
use storefront_api::errors::{AppError, AppResult, OptionExt};
use storefront_api::infra::{
    CartRepository, CouponRepository, HealthProbe, HeldLock, OrderRepository, ProductRepository,
    RateLimiter, ResourceLock, TransactionContext, TxFuture, UnitOfWork, UserRepository,
};
use storefront_api::jobs::{EmailJob, SmsJob};
use storefront_api::services::{
    AuthService, CartService, CouponService, Notifier, OrderService, ProductService,
    ServiceContainer, Services, UserService,
};
use storefront_api::types::PaginationParams;

pub const TEST_SECRET: &str = "test-secret-key-that-is-long-enough!!";
pub const TEST_PASSWORD: &str = "shop-secret";

// =============================================================================
// In-memory tables
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub cart: Vec<CartLine>,
    pub orders: Vec<Order>,
    pub order_lines: Vec<OrderLine>,
    pub coupons: Vec<Coupon>,
}

type Shared = Arc<Mutex<Tables>>;

fn lock(tables: &Shared) -> MutexGuard<'_, Tables> {
    tables.lock().expect("tables lock poisoned")
}

pub struct MemoryUsers(Shared);

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(lock(&self.0).users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(lock(&self.0)
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        Ok(lock(&self.0)
            .users
            .iter()
            .find(|u| u.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn find_admin(&self) -> AppResult<Option<User>> {
        Ok(lock(&self.0).users.iter().find(|u| u.is_admin()).cloned())
    }

    async fn create(&self, user: User) -> AppResult<User> {
        let mut tables = lock(&self.0);
        let clash = tables.users.iter().any(|u| {
            (user.email.is_some() && u.email == user.email)
                || (user.phone.is_some() && u.phone == user.phone)
                || (user.is_admin() && u.is_admin())
        });
        if clash {
            return Err(AppError::conflict("User"));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> AppResult<User> {
        let mut tables = lock(&self.0);
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_not_found("User")?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = changes.address {
            user.address = Some(address);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_reset_challenge(
        &self,
        id: Uuid,
        challenge: Option<ResetChallenge>,
    ) -> AppResult<()> {
        let mut tables = lock(&self.0);
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_not_found("User")?;
        user.reset_challenge = challenge;
        Ok(())
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut tables = lock(&self.0);
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_not_found("User")?;
        user.password_hash = password_hash;
        user.reset_challenge = None;
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut tables = lock(&self.0);
        if role.is_admin() && tables.users.iter().any(|u| u.is_admin() && u.id != id) {
            return Err(AppError::conflict("User"));
        }
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_not_found("User")?;
        user.role = role;
        Ok(user.clone())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users = lock(&self.0).users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

pub struct MemoryProducts(Shared);

fn name_matches(product: &Product, term: &str) -> bool {
    product.name.to_lowercase().contains(&term.to_lowercase())
}

#[async_trait]
impl ProductRepository for MemoryProducts {
    async fn list(
        &self,
        query: ProductQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<Product>, u64)> {
        let mut matched: Vec<Product> = lock(&self.0)
            .products
            .iter()
            .filter(|p| query.category.as_deref().map_or(true, |c| p.category == c))
            .filter(|p| query.search.as_deref().map_or(true, |s| name_matches(p, s)))
            .filter(|p| query.min_price.map_or(true, |min| p.price >= min))
            .filter(|p| query.max_price.map_or(true, |max| p.price <= max))
            .cloned()
            .collect();

        match query.sort.unwrap_or_default() {
            ProductSort::PriceAsc => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            ProductSort::PriceDesc => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            ProductSort::Newest => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn search(&self, term: String, category: Option<String>) -> AppResult<Vec<Product>> {
        Ok(lock(&self.0)
            .products
            .iter()
            .filter(|p| name_matches(p, &term))
            .filter(|p| category.as_deref().map_or(true, |c| p.category == c))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(lock(&self.0).products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, input: NewProduct) -> AppResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            category: input.category,
            price: input.price,
            stock: input.stock.unwrap_or(0),
            description: input.description,
            image: input.image,
            images: input.images,
            colors: input.colors,
            created_at: now,
            updated_at: now,
        };
        lock(&self.0).products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        let mut tables = lock(&self.0);
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_not_found("Product")?;
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(category) = changes.category {
            product.category = category;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(stock) = changes.stock {
            product.stock = stock;
        }
        if let Some(description) = changes.description {
            product.description = Some(description);
        }
        if let Some(image) = changes.image {
            product.image = image;
        }
        if let Some(images) = changes.images {
            product.images = images;
        }
        if let Some(colors) = changes.colors {
            product.colors = colors;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }
}

pub struct MemoryCarts(Shared);

#[async_trait]
impl CartRepository for MemoryCarts {
    async fn lines_with_products(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(CartLine, Option<Product>)>> {
        let tables = lock(&self.0);
        Ok(tables
            .cart
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| {
                let product = tables.products.iter().find(|p| p.id == l.product_id).cloned();
                (l.clone(), product)
            })
            .collect())
    }

    async fn lines(&self, user_id: Uuid) -> AppResult<Vec<CartLine>> {
        Ok(lock(&self.0)
            .cart
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        selected_color: Option<String>,
    ) -> AppResult<CartLine> {
        let line = CartLine {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity,
            selected_color,
            created_at: Utc::now(),
        };
        lock(&self.0).cart.push(line.clone());
        Ok(line)
    }

    async fn set_quantity(&self, line_id: Uuid, quantity: i32) -> AppResult<()> {
        let mut tables = lock(&self.0);
        let line = tables
            .cart
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_not_found("Cart item")?;
        line.quantity = quantity;
        Ok(())
    }

    async fn delete_line(&self, line_id: Uuid) -> AppResult<()> {
        let mut tables = lock(&self.0);
        let before = tables.cart.len();
        tables.cart.retain(|l| l.id != line_id);
        if tables.cart.len() == before {
            return Err(AppError::not_found("Cart item"));
        }
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<u64> {
        let mut tables = lock(&self.0);
        let before = tables.cart.len();
        tables.cart.retain(|l| l.user_id != user_id);
        Ok((before - tables.cart.len()) as u64)
    }
}

pub struct MemoryOrders(Shared);

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl OrderRepository for MemoryOrders {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(lock(&self.0).orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        let mut orders: Vec<Order> = lock(&self.0)
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn list_all(&self) -> AppResult<Vec<(Order, Option<User>)>> {
        let tables = lock(&self.0);
        let mut orders = tables.orders.clone();
        newest_first(&mut orders);
        Ok(orders
            .into_iter()
            .map(|o| {
                let user = tables.users.iter().find(|u| u.id == o.user_id).cloned();
                (o, user)
            })
            .collect())
    }

    async fn lines_with_products(
        &self,
        order_ids: Vec<Uuid>,
    ) -> AppResult<Vec<(OrderLine, Option<Product>)>> {
        let tables = lock(&self.0);
        Ok(tables
            .order_lines
            .iter()
            .filter(|l| order_ids.contains(&l.order_id))
            .map(|l| {
                let product = tables.products.iter().find(|p| p.id == l.product_id).cloned();
                (l.clone(), product)
            })
            .collect())
    }
}

pub struct MemoryCoupons(Shared);

#[async_trait]
impl CouponRepository for MemoryCoupons {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        Ok(lock(&self.0).coupons.iter().find(|c| c.code == code).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Coupon>> {
        Ok(lock(&self.0).coupons.clone())
    }

    async fn create(&self, input: CouponInput) -> AppResult<Coupon> {
        let mut tables = lock(&self.0);
        if tables.coupons.iter().any(|c| c.code == input.code) {
            return Err(AppError::conflict("Coupon"));
        }
        let now = Utc::now();
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: input.code,
            discount_percent: input.discount_percent,
            expires_at: input.expires_at,
            max_uses: input.max_uses,
            current_uses: 0,
            min_order_amount: input.min_order_amount,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        tables.coupons.push(coupon.clone());
        Ok(coupon)
    }

    async fn update(&self, id: Uuid, input: CouponInput) -> AppResult<Coupon> {
        let mut tables = lock(&self.0);
        let coupon = tables
            .coupons
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_not_found("Coupon")?;
        coupon.code = input.code;
        coupon.discount_percent = input.discount_percent;
        coupon.expires_at = input.expires_at;
        coupon.max_uses = input.max_uses;
        coupon.min_order_amount = input.min_order_amount;
        coupon.description = input.description;
        coupon.updated_at = Utc::now();
        Ok(coupon.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tables = lock(&self.0);
        let before = tables.coupons.len();
        tables.coupons.retain(|c| c.id != id);
        if tables.coupons.len() == before {
            return Err(AppError::not_found("Coupon"));
        }
        Ok(())
    }

    async fn increment_usage(&self, code: &str) -> AppResult<bool> {
        let mut tables = lock(&self.0);
        match tables.coupons.iter_mut().find(|c| c.code == code) {
            Some(coupon) => {
                coupon.current_uses += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// =============================================================================
// Transactions
// =============================================================================

pub struct MemoryTx(Shared);

#[async_trait]
impl TransactionContext for MemoryTx {
    async fn lock_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(lock(&self.0).products.iter().find(|p| p.id == id).cloned())
    }

    async fn set_product_stock(&self, id: Uuid, stock: i32) -> AppResult<()> {
        let mut tables = lock(&self.0);
        if let Some(product) = tables.products.iter_mut().find(|p| p.id == id) {
            product.stock = stock;
        }
        Ok(())
    }

    async fn lock_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(lock(&self.0).orders.iter().find(|o| o.id == id).cloned())
    }

    async fn insert_order(&self, order: NewOrder) -> AppResult<Order> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            total_amount: order.total_amount,
            status: OrderStatus::Pending,
            shipping_address: order.shipping_address,
            shipping_cost: order.shipping_cost,
            coupon_code: order.coupon_code,
            discount_amount: order.discount_amount,
            tracking_number: None,
            carrier: None,
            current_location: None,
            estimated_delivery: None,
            tracking_updates: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.0).orders.push(order.clone());
        Ok(order)
    }

    async fn insert_order_line(
        &self,
        order_id: Uuid,
        line: &RequestedLine,
        unit_price: Decimal,
    ) -> AppResult<OrderLine> {
        let order_line = OrderLine {
            id: Uuid::new_v4(),
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            price: unit_price,
            selected_color: line.selected_color.clone(),
        };
        lock(&self.0).order_lines.push(order_line.clone());
        Ok(order_line)
    }

    async fn order_lines(&self, order_id: Uuid) -> AppResult<Vec<OrderLine>> {
        Ok(lock(&self.0)
            .order_lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let mut tables = lock(&self.0);
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_not_found("Order")?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: Uuid) -> AppResult<()> {
        let mut tables = lock(&self.0);
        tables.order_lines.retain(|l| l.order_id != id);
        let before = tables.orders.len();
        tables.orders.retain(|o| o.id != id);
        if tables.orders.len() == before {
            return Err(AppError::not_found("Order"));
        }
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let mut tables = lock(&self.0);
        tables.cart.retain(|l| l.product_id != id);
        tables.order_lines.retain(|l| l.product_id != id);
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Err(AppError::not_found("Product"));
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let mut tables = lock(&self.0);
        let order_ids: Vec<Uuid> = tables
            .orders
            .iter()
            .filter(|o| o.user_id == id)
            .map(|o| o.id)
            .collect();
        tables.order_lines.retain(|l| !order_ids.contains(&l.order_id));
        tables.orders.retain(|o| o.user_id != id);
        tables.cart.retain(|l| l.user_id != id);
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }
}

/// Unit of work over shared in-memory tables. A failed transaction body
/// restores the tables as they were before it started.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Shared,
}

impl MemoryStore {
    pub fn tables(&self) -> MutexGuard<'_, Tables> {
        lock(&self.tables)
    }

    pub fn product(&self, id: Uuid) -> Product {
        self.tables()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .expect("product exists")
    }

    pub fn order(&self, id: Uuid) -> Order {
        self.tables()
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .expect("order exists")
    }

    pub fn user(&self, id: Uuid) -> User {
        self.tables()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .expect("user exists")
    }

    pub fn coupon(&self, code: &str) -> Coupon {
        self.tables()
            .coupons
            .iter()
            .find(|c| c.code == code)
            .cloned()
            .expect("coupon exists")
    }

    pub fn seed_user(&self, name: &str, email: &str, phone: Option<&str>, role: UserRole) -> User {
        let hash = Password::new(TEST_PASSWORD)
            .expect("hash test password")
            .into_string();
        let user = User::new(
            name.to_string(),
            Some(email.to_string()),
            phone.map(str::to_string),
            hash,
        )
        .with_role(role);
        self.tables().users.push(user.clone());
        user
    }

    pub fn seed_customer(&self, name: &str, email: &str, phone: &str) -> User {
        self.seed_user(name, email, Some(phone), UserRole::Customer)
    }

    pub fn seed_product(&self, name: &str, price: Decimal, stock: i32) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: "general".to_string(),
            price,
            stock,
            description: None,
            image: format!("/img/{}.png", name.to_lowercase()),
            images: Vec::new(),
            colors: vec!["Red".to_string(), "Blue".to_string()],
            created_at: now,
            updated_at: now,
        };
        self.tables().products.push(product.clone());
        product
    }

    pub fn seed_coupon(
        &self,
        code: &str,
        percent: i64,
        max_uses: Option<i32>,
        current_uses: i32,
        expires_in_days: i64,
    ) -> Coupon {
        let now = Utc::now();
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: code.to_string(),
            discount_percent: Decimal::from(percent),
            expires_at: now + Duration::days(expires_in_days),
            max_uses,
            current_uses,
            min_order_amount: None,
            description: None,
            created_at: now,
            updated_at: now,
        };
        self.tables().coupons.push(coupon.clone());
        coupon
    }
}

#[async_trait]
impl UnitOfWork for MemoryStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(MemoryUsers(self.tables.clone()))
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        Arc::new(MemoryProducts(self.tables.clone()))
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        Arc::new(MemoryCarts(self.tables.clone()))
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        Arc::new(MemoryOrders(self.tables.clone()))
    }

    fn coupons(&self) -> Arc<dyn CouponRepository> {
        Arc::new(MemoryCoupons(self.tables.clone()))
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a dyn TransactionContext) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let snapshot = lock(&self.tables).clone();
        let tx = MemoryTx(self.tables.clone());

        let outcome = f(&tx).await;
        if outcome.is_err() {
            *lock(&self.tables) = snapshot;
        }
        outcome
    }
}

// =============================================================================
// Notification and Redis doubles
// =============================================================================

/// Keeps every job handed to it; optionally refuses email.
#[derive(Default)]
pub struct RecordingNotifier {
    pub emails: Mutex<Vec<EmailJob>>,
    pub sms: Mutex<Vec<SmsJob>>,
    pub refuse_email: bool,
}

impl RecordingNotifier {
    pub fn refusing_email() -> Self {
        Self {
            refuse_email: true,
            ..Self::default()
        }
    }

    pub fn email_subjects(&self) -> Vec<String> {
        self.emails
            .lock()
            .expect("emails lock")
            .iter()
            .map(|job| job.subject.clone())
            .collect()
    }

    pub fn sms_bodies(&self) -> Vec<String> {
        self.sms
            .lock()
            .expect("sms lock")
            .iter()
            .map(|job| job.body.clone())
            .collect()
    }

    pub fn forget(&self) {
        self.emails.lock().expect("emails lock").clear();
        self.sms.lock().expect("sms lock").clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, job: EmailJob) -> AppResult<()> {
        if self.refuse_email {
            return Err(AppError::internal("queue unavailable"));
        }
        self.emails.lock().expect("emails lock").push(job);
        Ok(())
    }

    async fn send_sms(&self, job: SmsJob) -> AppResult<()> {
        self.sms.lock().expect("sms lock").push(job);
        Ok(())
    }
}

/// Single-process lock: every acquisition succeeds.
pub struct NoopLock;

#[async_trait]
impl ResourceLock for NoopLock {
    async fn acquire(&self, _resource: &str) -> AppResult<HeldLock> {
        Ok(Box::new(()))
    }
}

/// Counts requests but never limits.
#[derive(Default)]
pub struct UnlimitedRate {
    pub hits: Mutex<u64>,
}

#[async_trait]
impl RateLimiter for UnlimitedRate {
    async fn hit(&self, _identifier: &str, _max: u64, _window: u64) -> AppResult<(u64, bool)> {
        let mut hits = self.hits.lock().expect("hits lock");
        *hits += 1;
        Ok((*hits, true))
    }
}

/// Fixed health answers.
pub struct StaticProbe {
    pub database: Result<(), String>,
    pub redis: Result<(), String>,
}

#[async_trait]
impl HealthProbe for StaticProbe {
    async fn database(&self) -> Result<(), String> {
        self.database.clone()
    }

    async fn redis(&self) -> Result<(), String> {
        self.redis.clone()
    }
}

// =============================================================================
// Harness
// =============================================================================

pub fn money(amount: i64) -> Decimal {
    Decimal::from(amount)
}

pub fn test_config() -> Config {
    Config::for_tests(TEST_SECRET)
}

pub fn address() -> Address {
    Address {
        street: "12 Market Road".to_string(),
        city: "Pune".to_string(),
        state: "Maharashtra".to_string(),
        zip_code: "411001".to_string(),
        country: "India".to_string(),
    }
}

/// Real services wired over the in-memory store.
pub struct Harness {
    pub store: MemoryStore,
    pub notifier: Arc<RecordingNotifier>,
    pub services: Services,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self::build(notifier, test_config())
    }

    pub fn build(notifier: RecordingNotifier, config: Config) -> Self {
        let store = MemoryStore::default();
        let notifier = Arc::new(notifier);
        let services = Services::new(
            Arc::new(store.clone()),
            config,
            notifier.clone(),
            Arc::new(NoopLock),
        );
        Self {
            store,
            notifier,
            services,
        }
    }
}

impl Harness {
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
