//! End-to-end checkout: cart, order, coupon, payment, and the emails that
//! fan out along the way.

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use orchard_commerce::services::coupons::CreateCouponParams;
use orchard_commerce::services::orders::{CreateOrderParams, OrderError};
use orchard_core::{Money, OrderStatus};
use orchard_integration_tests::TestContext;

/// Wait for the background email tasks to drain.
async fn wait_for_emails(ctx: &TestContext, count: usize) {
    for _ in 0..100 {
        if ctx.mailer.sent().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {count} emails, saw {:?}",
        ctx.mailer.sent().len()
    );
}

#[tokio::test]
async fn full_checkout_with_coupon_and_payment() {
    let ctx = TestContext::new();
    let _ = ctx
        .coupons
        .create(
            ctx.manager,
            CreateCouponParams {
                code: "SAVE10".to_string(),
                discount_amount: None,
                discount_percentage: Some(Decimal::TEN),
                valid_until: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            },
        )
        .unwrap();

    // two mugs at 19.99
    ctx.fill_cart(2);
    let cart = ctx.carts.get_cart(ctx.customer).unwrap();
    assert_eq!(cart.cart.total, Money::from_cents(3998));

    let view = ctx
        .orders
        .create_order(ctx.customer, CreateOrderParams::default())
        .unwrap();
    assert_eq!(view.order.status, OrderStatus::Pending);
    assert_eq!(view.order.total, Money::from_cents(3998));

    // 10% off 39.98 rounds to 35.98
    let order = ctx
        .orders
        .apply_coupon(ctx.customer, view.order.id, "SAVE10")
        .unwrap();
    assert_eq!(order.total, Money::from_cents(3598));

    let order = ctx
        .orders
        .update_status(ctx.manager, order.id, OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Paid);

    // welcome (registration), confirmation (checkout), payment status
    wait_for_emails(&ctx, 3).await;
    let sent = ctx.mailer.sent();
    assert!(sent.iter().any(|e| e.subject == "Your order is confirmed"));
    assert!(sent.iter().any(|e| e.subject == "Your order is paid"));
    assert!(sent.iter().all(|e| e.to == "customer@example.com"));
}

#[tokio::test]
async fn expired_coupon_aborts_checkout_and_keeps_the_cart() {
    let ctx = TestContext::new();
    let _ = ctx
        .coupons
        .create(
            ctx.manager,
            CreateCouponParams {
                code: "OLD".to_string(),
                discount_amount: Some(Money::from_cents(500)),
                discount_percentage: None,
                valid_until: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            },
        )
        .unwrap();

    ctx.fill_cart(1);
    let params = CreateOrderParams {
        coupon_code: Some("OLD".to_string()),
        ..CreateOrderParams::default()
    };
    assert!(matches!(
        ctx.orders.create_order(ctx.customer, params),
        Err(OrderError::InvalidCoupon(_))
    ));

    let cart = ctx.carts.get_cart(ctx.customer).unwrap();
    assert_eq!(cart.items.len(), 1);
    assert!(ctx.orders.list_orders(ctx.customer).is_empty());
}

#[tokio::test]
async fn flat_discount_never_drives_the_total_below_zero() {
    let ctx = TestContext::new();
    let _ = ctx
        .coupons
        .create(
            ctx.manager,
            CreateCouponParams {
                code: "BIG".to_string(),
                discount_amount: Some(Money::from_cents(100_000)),
                discount_percentage: None,
                valid_until: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            },
        )
        .unwrap();

    ctx.fill_cart(1);
    let params = CreateOrderParams {
        coupon_code: Some("BIG".to_string()),
        ..CreateOrderParams::default()
    };
    let view = ctx.orders.create_order(ctx.customer, params).unwrap();
    assert_eq!(view.order.total, Money::ZERO);
}

#[tokio::test]
async fn checkout_empties_the_cart_for_reuse() {
    let ctx = TestContext::new();
    ctx.fill_cart(2);
    let _ = ctx
        .orders
        .create_order(ctx.customer, CreateOrderParams::default())
        .unwrap();

    let cart = ctx.carts.get_cart(ctx.customer).unwrap();
    assert!(cart.items.is_empty());
    assert_eq!(cart.cart.total, Money::ZERO);

    // same cart takes the next purchase
    ctx.fill_cart(1);
    let second = ctx
        .orders
        .create_order(ctx.customer, CreateOrderParams::default())
        .unwrap();
    assert_eq!(second.order.total, Money::from_cents(1999));
    assert_eq!(ctx.orders.list_orders(ctx.customer).len(), 2);
}
