//! Notification templates.
//!
//! Builders for the email and SMS jobs sent by the account and order
//! workflows. SMS builders return `None` when the phone number is unusable.

use std::fmt::Write;

use super::format_phone;
use crate::config::RESET_CODE_TTL_MINUTES;
use crate::domain::OrderDetails;
use crate::jobs::{EmailJob, SmsJob};

const SIGNATURE: &str = "Thank you for shopping with us!\nThe Storefront Team";

pub fn reset_code_email(to: &str, name: &str, code: &str) -> EmailJob {
    EmailJob::new(
        to,
        "Your Password Reset OTP",
        format!(
            "Hi {name},\n\n\
             We received a request to reset your password. Your one-time code is:\n\n\
             {code}\n\n\
             The code expires in {RESET_CODE_TTL_MINUTES} minutes. If you did not ask for a \
             reset, you can ignore this email.\n\n{SIGNATURE}"
        ),
    )
}

pub fn password_changed_email(to: &str, name: &str) -> EmailJob {
    EmailJob::new(
        to,
        "Your Password Has Been Reset",
        format!(
            "Hi {name},\n\n\
             Your password was changed successfully. You can now log in with your new \
             password.\n\n\
             If you did not make this change, contact us immediately.\n\n{SIGNATURE}"
        ),
    )
}

fn item_lines(order: &OrderDetails) -> String {
    let mut out = String::new();
    for item in &order.items {
        let name = item
            .product
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("Product");
        let _ = write!(out, "  - {} x{} @ {}", name, item.quantity, item.price);
        if let Some(color) = &item.selected_color {
            let _ = write!(out, " ({})", color);
        }
        out.push('\n');
    }
    out
}

pub fn order_confirmation_email(to: &str, name: &str, order: &OrderDetails) -> EmailJob {
    EmailJob::new(
        to,
        "Order Confirmation - Your Order Has Been Placed",
        format!(
            "Hi {name},\n\n\
             Your order has been placed and confirmed.\n\n\
             Order ID: {id}\n\
             Order Date: {date}\n\
             Items:\n{items}\
             Total: {total}\n\n\
             You will receive a tracking number once your order ships.\n\n{SIGNATURE}",
            id = order.id,
            date = order.created_at.format("%B %-d, %Y"),
            items = item_lines(order),
            total = order.total_amount,
        ),
    )
}

pub fn order_shipped_email(to: &str, name: &str, order: &OrderDetails) -> EmailJob {
    EmailJob::new(
        to,
        "Your Order Has Been Shipped!",
        format!(
            "Hi {name},\n\n\
             Your order is on its way.\n\n\
             Order ID: {id}\n\
             Carrier: {carrier}\n\
             Tracking Number: {tracking}\n\
             Estimated Delivery: {eta}\n\n{SIGNATURE}",
            id = order.id,
            carrier = order.tracking.carrier,
            tracking = order.tracking.tracking_number,
            eta = order.tracking.estimated_delivery.format("%B %-d, %Y"),
        ),
    )
}

pub fn order_delivered_email(to: &str, name: &str, order: &OrderDetails) -> EmailJob {
    EmailJob::new(
        to,
        "Your Order Has Been Delivered!",
        format!(
            "Hi {name},\n\n\
             Your order {id} has been delivered. We hope you enjoy your purchase!\n\n{SIGNATURE}",
            id = order.id,
        ),
    )
}

fn sms(phone: &str, body: String) -> Option<SmsJob> {
    format_phone(phone).map(|to| SmsJob::new(to, body))
}

pub fn order_confirmed_sms(phone: &str, name: &str, order_id: &str) -> Option<SmsJob> {
    sms(
        phone,
        format!(
            "Hi {name}! Your order #{order_id} has been confirmed. We'll notify you when it \
             ships. Thank you for shopping with us!"
        ),
    )
}

pub fn order_cancelled_sms(phone: &str, name: &str, order_id: &str) -> Option<SmsJob> {
    sms(
        phone,
        format!(
            "Hi {name}! Your order #{order_id} has been cancelled. Your refund will be processed \
             within 5-7 business days. Thank you for shopping with us!"
        ),
    )
}

pub fn order_shipped_sms(
    phone: &str,
    name: &str,
    order_id: &str,
    tracking_number: &str,
) -> Option<SmsJob> {
    sms(
        phone,
        format!(
            "Hi {name}! Your order #{order_id} has shipped! Track your package: \
             {tracking_number}. Estimated delivery in 5-7 days."
        ),
    )
}

pub fn order_out_for_delivery_sms(phone: &str, name: &str, order_id: &str) -> Option<SmsJob> {
    sms(
        phone,
        format!(
            "Hi {name}! Your order #{order_id} is out for delivery today! Please be available \
             to receive it."
        ),
    )
}

pub fn order_delivered_sms(phone: &str, name: &str, order_id: &str) -> Option<SmsJob> {
    sms(
        phone,
        format!(
            "Hi {name}! Your order #{order_id} has been delivered! Thank you for shopping with \
             us. We hope you enjoy your purchase!"
        ),
    )
}
