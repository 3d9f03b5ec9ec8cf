//! Order service - checkout, fulfilment status and cancellations.
//!
//! Stock moves and order rows are written in one transaction. Cart cleanup,
//! coupon redemption and notifications happen after commit and never fail
//! the request.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::notifier::{email_best_effort, sms_best_effort, Notifier};
use crate::domain::{
    normalize_code, normalize_color, CreateOrder, CustomerSummary, NewOrder, Order, OrderDetails,
    OrderLine, OrderStatus, Product, RequestedLine, TrackingView, User,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{TransactionContext, UnitOfWork};
use crate::utils::templates;

/// Order service trait for dependency injection.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Place an order from the request lines, or from the cart when none are given
    async fn create_order(&self, user_id: Uuid, input: CreateOrder) -> AppResult<OrderDetails>;

    async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderDetails>;

    async fn list_orders(&self, user_id: Uuid) -> AppResult<Vec<OrderDetails>>;

    /// Every order with its buyer (admin)
    async fn list_all_orders(&self) -> AppResult<Vec<OrderDetails>>;

    async fn track_order(&self, user_id: Uuid, order_id: Uuid) -> AppResult<TrackingView>;

    /// Set any status (admin); cancelling puts the stock back
    async fn update_status(&self, order_id: Uuid, status: String) -> AppResult<OrderDetails>;

    async fn cancel_order(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderDetails>;

    async fn request_return(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderDetails>;

    /// Remove an order and its lines (admin)
    async fn delete_order(&self, order_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of OrderService using Unit of Work.
pub struct OrderDesk<U: UnitOfWork> {
    uow: Arc<U>,
    notifier: Arc<dyn Notifier>,
}

fn ensure_owner(order: &Order, user_id: Uuid) -> AppResult<()> {
    if order.user_id != user_id {
        return Err(AppError::forbidden("Not authorized to access this order"));
    }
    Ok(())
}

/// Reserve stock and write the order with its lines.
async fn place_order(
    tx: &dyn TransactionContext,
    header: NewOrder,
    client_total: Option<Decimal>,
    lines: Vec<RequestedLine>,
) -> AppResult<(Order, Vec<(OrderLine, Option<Product>)>)> {
    let mut running_total = Decimal::ZERO;
    let mut reserved = Vec::with_capacity(lines.len());

    for line in &lines {
        let mut product = tx
            .lock_product(line.product_id)
            .await?
            .ok_or_not_found("Product")?;

        if !product.has_stock_for(line.quantity) {
            return Err(AppError::InsufficientStock(product.name));
        }

        running_total += product.price * Decimal::from(line.quantity);
        product.stock -= line.quantity;
        tx.set_product_stock(product.id, product.stock).await?;
        reserved.push(product);
    }

    let order = tx
        .insert_order(NewOrder {
            total_amount: client_total.unwrap_or(running_total),
            ..header
        })
        .await?;

    let mut written = Vec::with_capacity(lines.len());
    for (line, product) in lines.iter().zip(reserved) {
        let order_line = tx.insert_order_line(order.id, line, product.price).await?;
        written.push((order_line, Some(product)));
    }

    Ok((order, written))
}

/// Put every line's quantity back on its product. Vanished products are skipped.
async fn restore_stock(tx: &dyn TransactionContext, order_id: Uuid) -> AppResult<()> {
    for line in tx.order_lines(order_id).await? {
        if let Some(product) = tx.lock_product(line.product_id).await? {
            tx.set_product_stock(product.id, product.stock + line.quantity)
                .await?;
        }
    }
    Ok(())
}

/// Write a new status, restoring stock when the order becomes cancelled.
/// Returns the previous status with the updated order.
async fn transition(
    tx: &dyn TransactionContext,
    order_id: Uuid,
    next: OrderStatus,
) -> AppResult<(OrderStatus, Order)> {
    let current = tx.lock_order(order_id).await?.ok_or_not_found("Order")?;

    if current.status.restores_stock_to(next) {
        restore_stock(tx, order_id).await?;
    }

    let updated = tx.set_order_status(order_id, next).await?;
    Ok((current.status, updated))
}

async fn cancel_owned(
    tx: &dyn TransactionContext,
    user_id: Uuid,
    order_id: Uuid,
) -> AppResult<Order> {
    let order = tx.lock_order(order_id).await?.ok_or_not_found("Order")?;
    ensure_owner(&order, user_id)?;

    if !order.status.customer_can_cancel() {
        return Err(AppError::invalid_state("Cannot cancel order at this stage"));
    }
    if order.status == OrderStatus::Cancelled {
        return Err(AppError::invalid_state("Order is already cancelled"));
    }

    restore_stock(tx, order_id).await?;
    tx.set_order_status(order_id, OrderStatus::Cancelled).await
}

async fn return_owned(
    tx: &dyn TransactionContext,
    user_id: Uuid,
    order_id: Uuid,
) -> AppResult<Order> {
    let order = tx.lock_order(order_id).await?.ok_or_not_found("Order")?;
    ensure_owner(&order, user_id)?;

    if order.status != OrderStatus::Delivered {
        return Err(AppError::invalid_state("Only delivered orders can be returned"));
    }

    tx.set_order_status(order_id, OrderStatus::ReturnRequested)
        .await
}

impl<U: UnitOfWork> OrderDesk<U> {
    pub fn new(uow: Arc<U>, notifier: Arc<dyn Notifier>) -> Self {
        Self { uow, notifier }
    }

    async fn details(&self, order: Order) -> AppResult<OrderDetails> {
        let lines = self.uow.orders().lines_with_products(vec![order.id]).await?;
        Ok(OrderDetails::assemble(order, lines, None))
    }

    /// Enrich many orders with one line query.
    async fn details_many(
        &self,
        orders: Vec<(Order, Option<CustomerSummary>)>,
    ) -> AppResult<Vec<OrderDetails>> {
        let ids = orders.iter().map(|(order, _)| order.id).collect();
        let mut lines_by_order: HashMap<Uuid, Vec<(OrderLine, Option<Product>)>> = HashMap::new();
        for (line, product) in self.uow.orders().lines_with_products(ids).await? {
            lines_by_order
                .entry(line.order_id)
                .or_default()
                .push((line, product));
        }

        Ok(orders
            .into_iter()
            .map(|(order, customer)| {
                let lines = lines_by_order.remove(&order.id).unwrap_or_default();
                OrderDetails::assemble(order, lines, customer)
            })
            .collect())
    }

    async fn owned_order(&self, user_id: Uuid, order_id: Uuid) -> AppResult<Order> {
        let order = self
            .uow
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_not_found("Order")?;
        ensure_owner(&order, user_id)?;
        Ok(order)
    }

    /// Lines to order: the request's, or else the cart's.
    async fn requested_lines(
        &self,
        user_id: Uuid,
        input: &CreateOrder,
    ) -> AppResult<Vec<RequestedLine>> {
        let lines: Vec<RequestedLine> = if input.items.is_empty() {
            self.uow
                .carts()
                .lines(user_id)
                .await?
                .into_iter()
                .map(|line| RequestedLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    selected_color: line.selected_color,
                })
                .collect()
        } else {
            input
                .items
                .iter()
                .map(|item| RequestedLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    selected_color: normalize_color(item.selected_color.as_deref()),
                })
                .collect()
        };

        if lines.is_empty() {
            return Err(AppError::invalid_state("Cart is empty"));
        }
        if lines.iter().any(|line| line.quantity <= 0) {
            return Err(AppError::validation("Quantity must be at least 1"));
        }
        Ok(lines)
    }

    async fn buyer(&self, user_id: Uuid) -> Option<User> {
        match self.uow.users().find_by_id(user_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Buyer lookup for notification failed");
                None
            }
        }
    }

    async fn redeem_coupon(&self, code: &str) {
        match self.uow.coupons().increment_usage(code).await {
            Ok(true) => tracing::debug!(code = %code, "Coupon redeemed"),
            Ok(false) => tracing::warn!(code = %code, "Order used an unknown coupon code"),
            Err(e) => tracing::warn!(code = %code, error = %e, "Coupon usage not recorded"),
        }
    }

    async fn notify_placed(&self, user: &User, details: &OrderDetails) {
        let order_id = details.id.to_string();
        if let Some(email) = &user.email {
            email_best_effort(
                self.notifier.as_ref(),
                templates::order_confirmation_email(email, &user.name, details),
            )
            .await;
        }
        if let Some(phone) = &user.phone {
            sms_best_effort(
                self.notifier.as_ref(),
                templates::order_confirmed_sms(phone, &user.name, &order_id),
            )
            .await;
        }
    }

    async fn notify_status(&self, details: &OrderDetails) {
        let Some(user) = self.buyer(details.user_id).await else {
            return;
        };
        let notifier = self.notifier.as_ref();
        let order_id = details.id.to_string();
        let email = user.email.as_deref();
        let phone = user.phone.as_deref();

        match details.status {
            OrderStatus::Shipped => {
                if let Some(to) = email {
                    email_best_effort(
                        notifier,
                        templates::order_shipped_email(to, &user.name, details),
                    )
                    .await;
                }
                if let Some(phone) = phone {
                    let sms = templates::order_shipped_sms(
                        phone,
                        &user.name,
                        &order_id,
                        &details.tracking.tracking_number,
                    );
                    sms_best_effort(notifier, sms).await;
                }
            }
            OrderStatus::OutForDelivery => {
                if let Some(phone) = phone {
                    let sms = templates::order_out_for_delivery_sms(phone, &user.name, &order_id);
                    sms_best_effort(notifier, sms).await;
                }
            }
            OrderStatus::Delivered => {
                if let Some(to) = email {
                    email_best_effort(
                        notifier,
                        templates::order_delivered_email(to, &user.name, details),
                    )
                    .await;
                }
                if let Some(phone) = phone {
                    let sms = templates::order_delivered_sms(phone, &user.name, &order_id);
                    sms_best_effort(notifier, sms).await;
                }
            }
            _ => {}
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderDesk<U> {
    async fn create_order(&self, user_id: Uuid, input: CreateOrder) -> AppResult<OrderDetails> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("User")?;

        if user.is_admin() {
            return Err(AppError::forbidden("Admins cannot place orders"));
        }

        let lines = self.requested_lines(user_id, &input).await?;
        let coupon_code = input
            .coupon_code
            .as_deref()
            .and_then(|code| normalize_code(code).ok());

        let header = NewOrder {
            user_id,
            total_amount: Decimal::ZERO,
            shipping_address: input.shipping_address,
            shipping_cost: input.shipping_cost,
            coupon_code: coupon_code.clone(),
            discount_amount: input.discount_amount,
        };
        let client_total = input.total_amount;

        let (order, written) = self
            .uow
            .transaction(move |tx| Box::pin(place_order(tx, header, client_total, lines)))
            .await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.total_amount,
            lines = written.len(),
            "Order placed"
        );

        if let Err(e) = self.uow.carts().clear(user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Cart not cleared after checkout");
        }
        if let Some(code) = &coupon_code {
            self.redeem_coupon(code).await;
        }

        let details = OrderDetails::assemble(order, written, None);
        self.notify_placed(&user, &details).await;
        Ok(details)
    }

    async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderDetails> {
        let order = self.owned_order(user_id, order_id).await?;
        self.details(order).await
    }

    async fn list_orders(&self, user_id: Uuid) -> AppResult<Vec<OrderDetails>> {
        let orders = self.uow.orders().list_for_user(user_id).await?;
        self.details_many(orders.into_iter().map(|order| (order, None)).collect())
            .await
    }

    async fn list_all_orders(&self) -> AppResult<Vec<OrderDetails>> {
        let rows = self.uow.orders().list_all().await?;
        self.details_many(
            rows.into_iter()
                .map(|(order, user)| (order, user.as_ref().map(CustomerSummary::from)))
                .collect(),
        )
        .await
    }

    async fn track_order(&self, user_id: Uuid, order_id: Uuid) -> AppResult<TrackingView> {
        let details = self.get_order(user_id, order_id).await?;
        Ok(TrackingView::from(&details))
    }

    async fn update_status(&self, order_id: Uuid, status: String) -> AppResult<OrderDetails> {
        let next: OrderStatus = status.parse()?;

        let (previous, order) = self
            .uow
            .transaction(move |tx| Box::pin(transition(tx, order_id, next)))
            .await?;

        tracing::info!(order_id = %order_id, from = %previous, to = %next, "Order status updated");

        let details = self.details(order).await?;
        if previous != next {
            self.notify_status(&details).await;
        }
        Ok(details)
    }

    async fn cancel_order(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderDetails> {
        let order = self
            .uow
            .transaction(move |tx| Box::pin(cancel_owned(tx, user_id, order_id)))
            .await?;

        tracing::info!(order_id = %order_id, user_id = %user_id, "Order cancelled by customer");

        let details = self.details(order).await?;
        if let Some(user) = self.buyer(user_id).await {
            if let Some(phone) = &user.phone {
                sms_best_effort(
                    self.notifier.as_ref(),
                    templates::order_cancelled_sms(phone, &user.name, &order_id.to_string()),
                )
                .await;
            }
        }
        Ok(details)
    }

    async fn request_return(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderDetails> {
        let order = self
            .uow
            .transaction(move |tx| Box::pin(return_owned(tx, user_id, order_id)))
            .await?;

        tracing::info!(order_id = %order_id, user_id = %user_id, "Return requested");
        self.details(order).await
    }

    async fn delete_order(&self, order_id: Uuid) -> AppResult<()> {
        self.uow
            .transaction(move |tx| Box::pin(async move { tx.delete_order(order_id).await }))
            .await?;

        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }
}
