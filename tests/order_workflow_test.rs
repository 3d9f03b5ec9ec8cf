//! Checkout, cancellation and fulfilment against the in-memory store.

mod common;

use rust_decimal::Decimal;
use uuid::Uuid;

use common::{address, money, Harness, RecordingNotifier};
use storefront_api::domain::{CouponInput, CreateOrder, OrderItemInput, OrderStatus, UserRole};
use storefront_api::errors::AppError;

fn order_of(lines: &[(Uuid, i32)]) -> CreateOrder {
    CreateOrder {
        shipping_address: address(),
        items: lines
            .iter()
            .map(|(product_id, quantity)| OrderItemInput {
                product_id: *product_id,
                quantity: *quantity,
                price: None,
                selected_color: None,
            })
            .collect(),
        total_amount: None,
        shipping_cost: None,
        coupon_code: None,
        discount_amount: None,
    }
}

fn from_cart() -> CreateOrder {
    order_of(&[])
}

#[tokio::test]
async fn test_checkout_reserves_stock_and_cancel_restores_it_once() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Asha", "asha@example.com", "9876543210");
    let lamp = h.store.seed_product("Lamp", money(250), 10);
    let rug = h.store.seed_product("Rug", money(1200), 3);

    let orders = h.orders();
    let placed = orders
        .create_order(buyer.id, order_of(&[(lamp.id, 4), (rug.id, 3)]))
        .await
        .unwrap();

    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.total_amount, money(4600));
    assert_eq!(placed.items.len(), 2);
    assert_eq!(h.store.product(lamp.id).stock, 6);
    assert_eq!(h.store.product(rug.id).stock, 0);

    let cancelled = orders.cancel_order(buyer.id, placed.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(h.store.product(lamp.id).stock, 10);
    assert_eq!(h.store.product(rug.id).stock, 3);

    let again = orders.cancel_order(buyer.id, placed.id).await;
    assert!(matches!(again, Err(AppError::InvalidState(msg)) if msg == "Order is already cancelled"));
    assert_eq!(h.store.product(lamp.id).stock, 10);
}

#[tokio::test]
async fn test_insufficient_stock_leaves_no_trace() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Ravi", "ravi@example.com", "9876543211");
    let mug = h.store.seed_product("Mug", money(99), 5);
    let vase = h.store.seed_product("Vase", money(450), 1);

    let result = h
        .orders()
        .create_order(buyer.id, order_of(&[(mug.id, 2), (vase.id, 2)]))
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock(name)) if name == "Vase"));
    // The mug line was reserved before the vase failed
    assert_eq!(h.store.product(mug.id).stock, 5);
    assert_eq!(h.store.product(vase.id).stock, 1);
    assert!(h.store.tables().orders.is_empty());
    assert!(h.store.tables().order_lines.is_empty());
    assert!(h.notifier.email_subjects().is_empty());
}

#[tokio::test]
async fn test_checkout_from_cart_clears_cart_and_confirms() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Meera", "meera@example.com", "9876543212");
    let kettle = h.store.seed_product("Kettle", money(800), 4);

    let carts = h.carts();
    carts
        .add_item(buyer.id, kettle.id, 1, Some("Red".to_string()))
        .await
        .unwrap();
    carts
        .add_item(buyer.id, kettle.id, 1, Some(" Red ".to_string()))
        .await
        .unwrap();

    let placed = h
        .orders()
        .create_order(buyer.id, from_cart())
        .await
        .unwrap();

    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].quantity, 2);
    assert_eq!(placed.items[0].price, money(800));
    assert_eq!(h.store.product(kettle.id).stock, 2);
    assert!(carts.get_cart(buyer.id).await.unwrap().items.is_empty());
    assert_eq!(
        h.notifier.email_subjects(),
        vec!["Order Confirmation - Your Order Has Been Placed".to_string()]
    );
    assert_eq!(h.notifier.sms_bodies().len(), 1);
}

#[tokio::test]
async fn test_empty_cart_checkout_is_rejected() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Kiran", "kiran@example.com", "9876543213");

    let result = h.orders().create_order(buyer.id, from_cart()).await;

    assert!(matches!(result, Err(AppError::InvalidState(msg)) if msg == "Cart is empty"));
}

#[tokio::test]
async fn test_client_total_is_stored_as_given() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Nila", "nila@example.com", "9876543214");
    let chair = h.store.seed_product("Chair", money(1000), 2);

    let mut input = order_of(&[(chair.id, 1)]);
    input.total_amount = Some(money(950));
    input.shipping_cost = Some(money(50));
    input.discount_amount = Some(money(100));

    let placed = h
        .orders()
        .create_order(buyer.id, input)
        .await
        .unwrap();

    assert_eq!(placed.total_amount, money(950));
    assert_eq!(placed.shipping_cost, Some(money(50)));
    assert_eq!(placed.discount_amount, Some(money(100)));
}

#[tokio::test]
async fn test_admin_cannot_place_orders() {
    let h = Harness::new();
    let admin = h
        .store
        .seed_user("Owner", "owner@example.com", None, UserRole::Admin);
    let desk = h.store.seed_product("Desk", money(5000), 2);

    let result = h
        .orders()
        .create_order(admin.id, order_of(&[(desk.id, 1)]))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(h.store.product(desk.id).stock, 2);
}

#[tokio::test]
async fn test_shipping_notifies_and_blocks_customer_cancel() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Dev", "dev@example.com", "9876543215");
    let clock = h.store.seed_product("Clock", money(300), 5);
    let orders = h.orders();

    let placed = orders
        .create_order(buyer.id, order_of(&[(clock.id, 2)]))
        .await
        .unwrap();
    h.notifier.forget();

    let shipped = orders
        .update_status(placed.id, "shipped".to_string())
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(
        h.notifier.email_subjects(),
        vec!["Your Order Has Been Shipped!".to_string()]
    );
    let sms = h.notifier.sms_bodies();
    assert_eq!(sms.len(), 1);
    assert!(sms[0].contains(&shipped.tracking.tracking_number));

    let result = orders.cancel_order(buyer.id, placed.id).await;
    assert!(
        matches!(result, Err(AppError::InvalidState(msg)) if msg == "Cannot cancel order at this stage")
    );
    assert_eq!(h.store.product(clock.id).stock, 3);
}

#[tokio::test]
async fn test_repeated_shipped_write_sends_nothing_new() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Noor", "noor@example.com", "9876543230");
    let kettle = h.store.seed_product("Kettle", money(800), 3);
    let orders = h.orders();

    let placed = orders
        .create_order(buyer.id, order_of(&[(kettle.id, 1)]))
        .await
        .unwrap();
    orders
        .update_status(placed.id, "shipped".to_string())
        .await
        .unwrap();
    h.notifier.forget();

    let again = orders
        .update_status(placed.id, "SHIPPED".to_string())
        .await
        .unwrap();

    assert_eq!(again.status, OrderStatus::Shipped);
    assert!(h.notifier.email_subjects().is_empty());
    assert!(h.notifier.sms_bodies().is_empty());
}

#[tokio::test]
async fn test_admin_cancel_after_shipping_restores_stock() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Ira", "ira@example.com", "9876543216");
    let fan = h.store.seed_product("Fan", money(1500), 4);
    let orders = h.orders();

    let placed = orders
        .create_order(buyer.id, order_of(&[(fan.id, 3)]))
        .await
        .unwrap();
    orders
        .update_status(placed.id, "shipped".to_string())
        .await
        .unwrap();

    orders
        .update_status(placed.id, "Cancelled".to_string())
        .await
        .unwrap();
    assert_eq!(h.store.product(fan.id).stock, 4);

    // A second cancellation must not add the quantity again
    orders
        .update_status(placed.id, "cancelled".to_string())
        .await
        .unwrap();
    assert_eq!(h.store.product(fan.id).stock, 4);
}

#[tokio::test]
async fn test_unknown_status_is_rejected() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Tara", "tara@example.com", "9876543217");
    let pen = h.store.seed_product("Pen", money(20), 10);
    let orders = h.orders();

    let placed = orders
        .create_order(buyer.id, order_of(&[(pen.id, 1)]))
        .await
        .unwrap();

    let result = orders.update_status(placed.id, "teleported".to_string()).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(h.store.order(placed.id).status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_returns_only_after_delivery() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Uma", "uma@example.com", "9876543218");
    let bag = h.store.seed_product("Bag", money(700), 3);
    let orders = h.orders();

    let placed = orders
        .create_order(buyer.id, order_of(&[(bag.id, 1)]))
        .await
        .unwrap();

    let early = orders.request_return(buyer.id, placed.id).await;
    assert!(
        matches!(early, Err(AppError::InvalidState(msg)) if msg == "Only delivered orders can be returned")
    );

    h.notifier.forget();
    orders
        .update_status(placed.id, "delivered".to_string())
        .await
        .unwrap();
    assert_eq!(
        h.notifier.email_subjects(),
        vec!["Your Order Has Been Delivered!".to_string()]
    );

    let returned = orders.request_return(buyer.id, placed.id).await.unwrap();
    assert_eq!(returned.status, OrderStatus::ReturnRequested);
    assert_eq!(h.store.product(bag.id).stock, 2);
}

#[tokio::test]
async fn test_orders_are_private_to_their_buyer() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Amit", "amit@example.com", "9876543219");
    let other = h.store.seed_customer("Leela", "leela@example.com", "9876543220");
    let cap = h.store.seed_product("Cap", money(150), 5);
    let orders = h.orders();

    let placed = orders
        .create_order(buyer.id, order_of(&[(cap.id, 1)]))
        .await
        .unwrap();

    assert!(matches!(
        orders.get_order(other.id, placed.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        orders.cancel_order(other.id, placed.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        orders.get_order(buyer.id, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(orders.list_orders(other.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tracking_is_stable_for_an_order() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Sana", "sana@example.com", "9876543221");
    let book = h.store.seed_product("Book", money(399), 5);
    let orders = h.orders();

    let placed = orders
        .create_order(buyer.id, order_of(&[(book.id, 2)]))
        .await
        .unwrap();

    let first = orders.track_order(buyer.id, placed.id).await.unwrap();
    let second = orders.track_order(buyer.id, placed.id).await.unwrap();

    assert_eq!(first.tracking.tracking_number, second.tracking.tracking_number);
    assert!(first.tracking.tracking_number.starts_with("TRACK"));
    assert_eq!(first.tracking.carrier, "Standard Shipping");
    assert_eq!(first.item_count, 2);
    assert_eq!(first.tracking.tracking_updates.len(), 1);
}

#[tokio::test]
async fn test_admin_listing_includes_customer() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Nora", "nora@example.com", "9876543222");
    let tray = h.store.seed_product("Tray", money(60), 5);
    let orders = h.orders();

    orders
        .create_order(buyer.id, order_of(&[(tray.id, 1)]))
        .await
        .unwrap();

    let all = orders.list_all_orders().await.unwrap();
    assert_eq!(all.len(), 1);
    let customer = all[0].customer.as_ref().expect("customer attached");
    assert_eq!(customer.id, buyer.id);
    assert_eq!(customer.email.as_deref(), Some("nora@example.com"));
}

#[tokio::test]
async fn test_delete_order_removes_lines_without_touching_stock() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Omar", "omar@example.com", "9876543223");
    let jar = h.store.seed_product("Jar", money(45), 5);
    let orders = h.orders();

    let placed = orders
        .create_order(buyer.id, order_of(&[(jar.id, 2)]))
        .await
        .unwrap();
    orders.delete_order(placed.id).await.unwrap();

    assert!(h.store.tables().orders.is_empty());
    assert!(h.store.tables().order_lines.is_empty());
    assert_eq!(h.store.product(jar.id).stock, 3);
    assert!(matches!(
        orders.delete_order(placed.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_failed_confirmation_email_does_not_fail_checkout() {
    let h = Harness::with_notifier(RecordingNotifier::refusing_email());
    let buyer = h.store.seed_customer("Zoya", "zoya@example.com", "9876543224");
    let shelf = h.store.seed_product("Shelf", money(2200), 2);

    let placed = h
        .orders()
        .create_order(buyer.id, order_of(&[(shelf.id, 1)]))
        .await
        .unwrap();

    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(h.store.product(shelf.id).stock, 1);
    assert_eq!(h.notifier.sms_bodies().len(), 1);
}

// =============================================================================
// Coupons at checkout
// =============================================================================

#[tokio::test]
async fn test_coupon_quote_for_ten_percent() {
    let h = Harness::new();
    h.store.seed_coupon("SAVE10", 10, None, 0, 30);

    let quote = h
        .coupons()
        .validate(" save10 ".to_string(), money(1000))
        .await
        .unwrap();

    assert_eq!(quote.code, "SAVE10");
    assert_eq!(quote.discount_amount, money(100));
    assert_eq!(quote.final_total, money(900));
    // Quoting does not consume a use
    assert_eq!(h.store.coupon("SAVE10").current_uses, 0);
}

#[tokio::test]
async fn test_checkout_consumes_coupon_until_ceiling() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Priya", "priya@example.com", "9876543225");
    let plate = h.store.seed_product("Plate", money(500), 10);
    h.store.seed_coupon("FEST", 20, Some(2), 1, 30);
    let coupons = h.coupons();

    coupons.validate("FEST".to_string(), money(500)).await.unwrap();

    let mut input = order_of(&[(plate.id, 1)]);
    input.coupon_code = Some("fest".to_string());
    let placed = h
        .orders()
        .create_order(buyer.id, input)
        .await
        .unwrap();

    assert_eq!(placed.coupon_code.as_deref(), Some("FEST"));
    assert_eq!(h.store.coupon("FEST").current_uses, 2);

    let exhausted = coupons.validate("FEST".to_string(), money(500)).await;
    assert!(
        matches!(exhausted, Err(AppError::InvalidState(msg)) if msg == "Coupon has reached maximum uses")
    );
}

#[tokio::test]
async fn test_coupon_created_with_zero_limit_never_runs_out() {
    let h = Harness::new();
    let coupons = h.coupons();
    let input: CouponInput = serde_json::from_value(serde_json::json!({
        "code": "free0",
        "discountPercent": "10",
        "expiryDate": "2099-12-31",
        "maxUsageCount": 0
    }))
    .unwrap();

    let created = coupons.create(input).await.unwrap();
    assert_eq!(created.max_uses, None);

    let quote = coupons.validate("FREE0".to_string(), money(1000)).await.unwrap();
    assert_eq!(quote.discount_amount, money(100));
    assert_eq!(quote.final_total, money(900));
}

#[tokio::test]
async fn test_expired_and_unknown_coupons_are_refused() {
    let h = Harness::new();
    h.store.seed_coupon("OLD", 15, None, 0, -1);
    let coupons = h.coupons();

    let expired = coupons.validate("OLD".to_string(), money(100)).await;
    assert!(matches!(expired, Err(AppError::InvalidState(msg)) if msg == "Coupon has expired"));

    let unknown = coupons.validate("NOPE".to_string(), money(100)).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let blank = coupons.validate("   ".to_string(), money(100)).await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_cancelling_does_not_refund_coupon_use() {
    let h = Harness::new();
    let buyer = h.store.seed_customer("Rhea", "rhea@example.com", "9876543226");
    let cup = h.store.seed_product("Cup", money(80), 10);
    h.store.seed_coupon("ONCE", 5, Some(1), 0, 10);
    let orders = h.orders();

    let mut input = order_of(&[(cup.id, 1)]);
    input.coupon_code = Some("ONCE".to_string());
    let placed = orders.create_order(buyer.id, input).await.unwrap();
    orders.cancel_order(buyer.id, placed.id).await.unwrap();

    assert_eq!(h.store.coupon("ONCE").current_uses, 1);
    assert_eq!(h.store.product(cup.id).stock, 10);
}

#[tokio::test]
async fn test_zero_total_is_quoted() {
    let h = Harness::new();
    h.store.seed_coupon("FREE", 50, None, 0, 5);

    let quote = h
        .coupons()
        .validate("FREE".to_string(), Decimal::ZERO)
        .await
        .unwrap();

    assert_eq!(quote.discount_amount, Decimal::ZERO);
    assert_eq!(quote.final_total, Decimal::ZERO);
}
