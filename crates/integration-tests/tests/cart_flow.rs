//! Integration tests for browsing and the session cart.

#![allow(clippy::unwrap_used)]

use foodapp_integration_tests::{TestContext, location};
use foodapp_storefront::config::StorefrontConfig;
use reqwest::StatusCode;

#[tokio::test]
async fn test_home_lists_restaurants() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.page("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("The Gourmet Place"));
    assert!(body.contains("Quick Bites Central"));
    assert!(body.contains("/restaurant-menu/r1"));
}

#[tokio::test]
async fn test_home_search_filters_by_cuisine() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.page("/?q=vegan").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Vegan Delights"));
    assert!(!body.contains("Quick Bites Central"));
}

#[tokio::test]
async fn test_home_search_without_matches() {
    let ctx = TestContext::new().await;
    let (_, body) = ctx.page("/?q=zzzz").await;

    assert!(body.contains("No restaurants match your search."));
}

#[tokio::test]
async fn test_restaurant_page_shows_menu() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.page("/restaurant-menu/r1").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Appetizers"));
    assert!(body.contains("Bruschetta Classica"));
    assert!(body.contains("$8.99"));
    assert!(body.contains("Tiramisu"));
}

#[tokio::test]
async fn test_unknown_restaurant_is_not_found() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.page("/restaurant-menu/r999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Restaurant not found."));
}

#[tokio::test]
async fn test_empty_cart() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.page("/cart").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_add_redirects_back_with_notice() {
    let ctx = TestContext::new().await;
    let response = ctx
        .post_form("/restaurant-menu/r1/add", &[("item_id", "m3")])
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response).unwrap();
    assert_eq!(target, "/restaurant-menu/r1?added=m3");

    let (_, body) = ctx.page(&target).await;
    assert!(body.contains("Lasagna Bolognese added to cart."));
    assert!(body.contains(r#"id="cart-count">1<"#));
}

#[tokio::test]
async fn test_adding_same_item_merges_lines() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("r1", "m1").await;
    ctx.add_to_cart("r1", "m1").await;

    let (_, body) = ctx.page("/cart").await;
    assert_eq!(body.matches(r#"id="line-m1""#).count(), 1);
    assert!(body.contains(r#"name="quantity" value="2""#));
    // 2 x $8.99
    assert!(body.contains("$17.98"));
    // 8% tax, $5.00 delivery
    assert!(body.contains("$1.44"));
    assert!(body.contains("$24.42"));
}

#[tokio::test]
async fn test_item_from_other_restaurant_is_rejected() {
    let ctx = TestContext::new().await;
    let response = ctx
        .post_form("/restaurant-menu/r2/add", &[("item_id", "m1")])
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_quantity_and_remove() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("r1", "m1").await;
    ctx.add_to_cart("r1", "m5").await;

    let response = ctx
        .post_form("/cart/update", &[("item_id", "m1"), ("quantity", "3")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/cart"));

    let (_, body) = ctx.page("/cart").await;
    assert!(body.contains("$26.97"));

    ctx.post_form("/cart/remove", &[("item_id", "m5")]).await;
    let (_, body) = ctx.page("/cart").await;
    assert!(!body.contains("Tiramisu"));
    assert!(body.contains("Bruschetta Classica"));
}

#[tokio::test]
async fn test_cart_summary_offers_promo_code() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("r1", "m1").await;

    let (_, body) = ctx.page("/cart").await;
    assert!(body.contains(r#"<label for="promoCode">Promo Code</label>"#));
    assert!(body.contains(r#"placeholder="Enter code""#));
    assert!(body.contains(">Apply</button>"));
}

#[tokio::test]
async fn test_zero_quantity_removes_line() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("r1", "m1").await;

    ctx.post_form("/cart/update", &[("item_id", "m1"), ("quantity", "0")])
        .await;

    let (_, body) = ctx.page("/cart").await;
    assert!(body.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_non_numeric_quantity_is_bad_request() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("r1", "m1").await;

    let response = ctx
        .post_form("/cart/update", &[("item_id", "m1"), ("quantity", "lots")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("r1", "m1").await;

    let other = TestContext::client();
    let body = other
        .get(ctx.url("/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_demo_cart_seeds_new_visitors() {
    let ctx = TestContext::with_config(StorefrontConfig {
        demo_cart: true,
        ..StorefrontConfig::default()
    })
    .await;

    let (_, body) = ctx.page("/cart").await;
    assert!(body.contains("Bruschetta Classica"));
    assert!(body.contains("Lasagna Bolognese"));
    assert!(body.contains("Tiramisu"));
    // $35.98 + $9.00, 8% tax, $5.00 delivery
    assert!(body.contains("$44.98"));
    assert!(body.contains("$3.60"));
    assert!(body.contains("$53.58"));
}
