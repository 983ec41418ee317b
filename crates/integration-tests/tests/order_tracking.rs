//! Integration tests for order tracking and the progress simulation.
//!
//! Progress timers run on the context's manual scheduler, so each test moves
//! virtual time forward and then polls the page's status fragment.

#![allow(clippy::unwrap_used)]

use foodapp_core::DeliveryFlow;
use foodapp_integration_tests::{TestContext, location};
use foodapp_storefront::config::StorefrontConfig;
use reqwest::StatusCode;

fn current_step(body: &str, step: &str) -> bool {
    body.contains(&format!(
        r#"class="step step-current" data-step="{step}""#
    ))
}

#[tokio::test]
async fn test_tracking_page_starts_confirmed() {
    let ctx = TestContext::new().await;
    let page = ctx.open_tracking("ORD-42").await;

    assert!(page.body.contains("Order ID: ORD-42"));
    assert!(current_step(&page.body, "confirmed"));
    assert!(
        page.body
            .contains("Your order is confirmed and the restaurant is preparing it.")
    );
    assert!(page.body.contains(r#"data-terminal="false""#));
    assert!(page.status_path.starts_with("/order-tracking/ORD-42/status?view="));
    assert!(page.close_path.starts_with("/order-tracking/ORD-42/close?view="));
    assert_eq!(ctx.scheduler.pending(), 1);
}

#[tokio::test]
async fn test_unknown_order_shows_sample_details() {
    let ctx = TestContext::new().await;
    let page = ctx.open_tracking("ORD-unknown").await;

    assert!(page.body.contains("The Gourmet Place"));
    assert!(page.body.contains("123 Main St, Anytown, 12345"));
    assert!(page.body.contains("1x Lasagna Bolognese"));
    assert!(page.body.contains("1x Tiramisu"));
    assert!(page.body.contains("$34.16"));
}

#[tokio::test]
async fn test_progress_advances_through_delivery() {
    let ctx = TestContext::new().await;
    let page = ctx.open_tracking("ORD-1").await;

    ctx.advance_secs(2);
    let (_, body) = ctx.tracking_status(&page).await;
    assert!(current_step(&body, "confirmed"));

    ctx.advance_secs(1);
    let (_, body) = ctx.tracking_status(&page).await;
    assert!(current_step(&body, "preparing"));
    assert!(body.contains("The chef is working their magic on your order!"));
    assert!(body.contains(r#"class="step step-completed" data-step="confirmed""#));

    ctx.advance_secs(5);
    let (_, body) = ctx.tracking_status(&page).await;
    assert!(current_step(&body, "delivery"));
    // Delivery-only flow skips pickup, which reads as done
    assert!(body.contains(r#"class="step step-completed" data-step="pickup""#));

    ctx.advance_secs(7);
    let (_, body) = ctx.tracking_status(&page).await;
    assert!(current_step(&body, "delivered"));
    assert!(body.contains(r#"data-terminal="true""#));
    assert!(body.contains("Your order has been delivered. Enjoy your meal!"));
    assert_eq!(ctx.scheduler.pending(), 0);
}

#[tokio::test]
async fn test_pickup_flow_visits_pickup() {
    let ctx = TestContext::with_config(StorefrontConfig {
        order_flow: DeliveryFlow::WithPickup,
        ..StorefrontConfig::default()
    })
    .await;
    let page = ctx.open_tracking("ORD-7").await;

    ctx.advance_secs(8);
    let (_, body) = ctx.tracking_status(&page).await;
    assert!(current_step(&body, "pickup"));

    ctx.advance_secs(2);
    let (_, body) = ctx.tracking_status(&page).await;
    assert!(current_step(&body, "delivery"));

    ctx.advance_secs(7);
    let (_, body) = ctx.tracking_status(&page).await;
    assert!(current_step(&body, "delivered"));
}

#[tokio::test]
async fn test_close_stops_simulation() {
    let ctx = TestContext::new().await;
    let page = ctx.open_tracking("ORD-3").await;
    assert_eq!(ctx.scheduler.pending(), 1);

    assert_eq!(ctx.close_tracking(&page).await, StatusCode::NO_CONTENT);
    assert_eq!(ctx.scheduler.pending(), 0);

    let (status_code, _) = ctx.tracking_status(&page).await;
    assert_eq!(status_code, StatusCode::NOT_FOUND);

    // Closing again is harmless
    assert_eq!(ctx.close_tracking(&page).await, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_reload_restarts_from_first_step() {
    let ctx = TestContext::new().await;
    let first = ctx.open_tracking("ORD-5").await;
    ctx.advance_secs(3);

    // The page closes its view on pagehide before the reload mounts a new one
    ctx.close_tracking(&first).await;
    let second = ctx.open_tracking("ORD-5").await;
    assert!(current_step(&second.body, "confirmed"));
    assert_ne!(first.status_path, second.status_path);
    assert_eq!(ctx.scheduler.pending(), 1);

    ctx.advance_secs(3);
    let (_, body) = ctx.tracking_status(&second).await;
    assert!(current_step(&body, "preparing"));
}

#[tokio::test]
async fn test_other_visitor_does_not_rewind_view() {
    let ctx = TestContext::new().await;
    let first = ctx.open_tracking("ORD-1").await;
    ctx.advance_secs(9);
    let (_, body) = ctx.tracking_status(&first).await;
    assert!(current_step(&body, "delivery"));

    let other = TestContext::client();
    let second = ctx.open_tracking_with(&other, "ORD-1").await;
    assert!(current_step(&second.body, "confirmed"));

    let (status_code, body) = ctx.tracking_status(&first).await;
    assert_eq!(status_code, StatusCode::OK);
    assert!(current_step(&body, "delivery"));
    assert_eq!(ctx.scheduler.pending(), 2);
}

#[tokio::test]
async fn test_other_visitor_close_leaves_view_open() {
    let ctx = TestContext::new().await;
    let first = ctx.open_tracking("ORD-1").await;

    let other = TestContext::client();
    let second = ctx.open_tracking_with(&other, "ORD-1").await;
    assert_eq!(ctx.close_tracking(&second).await, StatusCode::NO_CONTENT);

    // A close without this page's view id does nothing either
    let response = ctx.post_form("/order-tracking/ORD-1/close", &[]).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    ctx.advance_secs(3);
    let (status_code, body) = ctx.tracking_status(&first).await;
    assert_eq!(status_code, StatusCode::OK);
    assert!(current_step(&body, "preparing"));

    let (status_code, _) = ctx.tracking_status(&second).await;
    assert_eq!(status_code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_view_id_does_not_carry_over_to_other_orders() {
    let ctx = TestContext::new().await;
    let page = ctx.open_tracking("ORD-A").await;

    let foreign = page.status_path.replace("ORD-A", "ORD-B");
    let (status_code, _) = ctx.page(&foreign).await;
    assert_eq!(status_code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_orders_progress_independently() {
    let ctx = TestContext::new().await;
    let a = ctx.open_tracking("ORD-A").await;
    ctx.advance_secs(3);
    let b = ctx.open_tracking("ORD-B").await;

    let (_, a) = ctx.tracking_status(&a).await;
    let (_, b) = ctx.tracking_status(&b).await;
    assert!(current_step(&a, "preparing"));
    assert!(current_step(&b, "confirmed"));
}

#[tokio::test]
async fn test_status_of_unopened_view_is_not_found() {
    let ctx = TestContext::new().await;

    let (status_code, _) = ctx.page("/order-tracking/ORD-never/status").await;
    assert_eq!(status_code, StatusCode::NOT_FOUND);

    let (status_code, _) = ctx
        .page("/order-tracking/ORD-never/status?view=00000000-0000-4000-8000-000000000000")
        .await;
    assert_eq!(status_code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_then_track() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("r2", "m6").await;

    let response = ctx.place_order().await;
    let target = location(&response).unwrap();
    let order_id = target.trim_start_matches("/order-tracking/");

    let page = ctx.open_tracking(order_id).await;
    assert!(page.body.contains("Quick Bites Central"));
    assert!(page.body.contains("1x Classic Smash Burger"));
    assert!(page.body.contains("PayPal"));
    assert!(current_step(&page.body, "confirmed"));

    ctx.advance_secs(15);
    let (_, body) = ctx.tracking_status(&page).await;
    assert!(current_step(&body, "delivered"));
}
