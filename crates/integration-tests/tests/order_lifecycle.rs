//! Order status state machine driven through the service layer.

use orchard_commerce::services::orders::{CreateOrderParams, OrderError};
use orchard_core::{OrderId, OrderStatus};
use orchard_integration_tests::TestContext;

fn checkout(ctx: &TestContext) -> OrderId {
    ctx.fill_cart(1);
    ctx.orders
        .create_order(ctx.customer, CreateOrderParams::default())
        .unwrap()
        .order
        .id
}

#[tokio::test]
async fn the_full_lifecycle_runs_in_sequence() {
    let ctx = TestContext::new();
    let id = checkout(&ctx);

    for status in [
        OrderStatus::Paid,
        OrderStatus::InPreparation,
        OrderStatus::InDelivery,
        OrderStatus::Delivered,
    ] {
        let order = ctx.orders.update_status(ctx.manager, id, status).await.unwrap();
        assert_eq!(order.status, status);
    }

    let order = ctx.orders.get_order(ctx.customer, id).unwrap().order;
    assert_eq!(order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn stages_cannot_be_skipped_or_rewound() {
    let ctx = TestContext::new();
    let id = checkout(&ctx);

    assert!(matches!(
        ctx.orders.update_status(ctx.manager, id, OrderStatus::InDelivery).await,
        Err(OrderError::InvalidTransition { .. })
    ));

    let _ = ctx.orders.update_status(ctx.manager, id, OrderStatus::Paid).await.unwrap();
    assert!(matches!(
        ctx.orders.update_status(ctx.manager, id, OrderStatus::Pending).await,
        Err(OrderError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn cancellation_works_until_delivery_or_prior_cancellation() {
    let ctx = TestContext::new();
    let id = checkout(&ctx);

    let _ = ctx.orders.update_status(ctx.manager, id, OrderStatus::Paid).await.unwrap();
    let order = ctx
        .orders
        .update_status(ctx.manager, id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);

    // terminal: nothing moves a cancelled order
    assert!(matches!(
        ctx.orders.update_status(ctx.manager, id, OrderStatus::Paid).await,
        Err(OrderError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn a_failed_status_email_surfaces_but_the_transition_sticks() {
    let ctx = TestContext::new();
    let id = checkout(&ctx);

    ctx.mailer.set_failing(true);
    let result = ctx.orders.update_status(ctx.manager, id, OrderStatus::Paid).await;
    assert!(matches!(result, Err(OrderError::EmailDelivery(_))));

    // the transition committed before the email was attempted
    let order = ctx.orders.get_order(ctx.manager, id).unwrap().order;
    assert_eq!(order.status, OrderStatus::Paid);

    // the in-app notification also went out
    let inbox = ctx.dispatcher.list(ctx.customer);
    assert!(inbox
        .iter()
        .any(|n| n.kind == orchard_core::NotificationType::OrderStatus));
}

#[tokio::test]
async fn tracking_is_staff_written_and_owner_readable() {
    let ctx = TestContext::new();
    let id = checkout(&ctx);

    assert!(matches!(
        ctx.orders.set_tracking(ctx.customer, id, "TRK-42"),
        Err(OrderError::Auth(_))
    ));
    let _ = ctx.orders.set_tracking(ctx.manager, id, "TRK-42").unwrap();
    assert_eq!(
        ctx.orders.get_tracking(ctx.customer, id).unwrap().as_deref(),
        Some("TRK-42")
    );
}

#[tokio::test]
async fn listings_split_by_ownership_and_role() {
    let ctx = TestContext::new();
    let id = checkout(&ctx);

    assert_eq!(ctx.orders.list_orders(ctx.customer).len(), 1);
    assert!(ctx.orders.list_orders(ctx.manager).is_empty());

    let all = ctx.orders.list_all_orders(ctx.manager).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert!(ctx.orders.list_all_orders(ctx.customer).is_err());
}
