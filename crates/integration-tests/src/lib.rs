//! Integration tests for the FoodApp storefront.
//!
//! Each test starts the real router on an ephemeral local port and talks to
//! it over HTTP with a cookie-carrying client, so the session behaves exactly
//! as it does in a browser. Order progress runs on a [`ManualScheduler`];
//! tests move virtual time forward instead of sleeping.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p foodapp-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use foodapp_storefront::config::StorefrontConfig;
use foodapp_storefront::services::ManualScheduler;
use foodapp_storefront::state::AppState;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running storefront plus a client with its own cookie jar.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub state: AppState,
    pub scheduler: Arc<ManualScheduler>,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start a storefront with default configuration.
    pub async fn new() -> Self {
        Self::with_config(StorefrontConfig::default()).await
    }

    /// Start a storefront with the given configuration.
    pub async fn with_config(config: StorefrontConfig) -> Self {
        let scheduler = Arc::new(ManualScheduler::new());
        let state = AppState::with_scheduler(config, scheduler.clone());
        let app = foodapp_storefront::app(state.clone());

        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener address");

        let server = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("test server error");
        });

        Self {
            client: Self::client(),
            base_url: format!("http://{addr}"),
            state,
            scheduler,
            server,
        }
    }

    /// A fresh client (new cookie jar) that does not follow redirects.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// GET a page and return its status and body.
    pub async fn page(&self, path: &str) -> (StatusCode, String) {
        let response = self.get(path).await;
        let status = response.status();
        (status, response.text().await.expect("response body"))
    }

    /// Add one unit of a menu item through the restaurant page form.
    pub async fn add_to_cart(&self, restaurant_id: &str, item_id: &str) {
        let response = self
            .post_form(
                &format!("/restaurant-menu/{restaurant_id}/add"),
                &[("item_id", item_id)],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "add to cart");
    }

    /// Submit a checkout form that passes validation.
    pub async fn place_order(&self) -> Response {
        self.post_form("/checkout", VALID_CHECKOUT).await
    }

    /// Open an order-tracking page, mounting a fresh view.
    pub async fn open_tracking(&self, order_id: &str) -> TrackingPage {
        self.open_tracking_with(&self.client, order_id).await
    }

    /// Open an order-tracking page as another visitor.
    pub async fn open_tracking_with(&self, client: &Client, order_id: &str) -> TrackingPage {
        let response = client
            .get(self.url(&format!("/order-tracking/{order_id}")))
            .send()
            .await
            .expect("GET request failed");
        assert_eq!(response.status(), StatusCode::OK, "tracking page");
        TrackingPage::parse(response.text().await.expect("response body"))
    }

    /// Poll a tracking page's status fragment.
    pub async fn tracking_status(&self, page: &TrackingPage) -> (StatusCode, String) {
        self.page(&page.status_path).await
    }

    /// Send a tracking page's close request.
    pub async fn close_tracking(&self, page: &TrackingPage) -> StatusCode {
        self.post_form(&page.close_path, &[]).await.status()
    }

    /// Move order simulations forward by `secs` seconds of virtual time.
    pub fn advance_secs(&self, secs: u64) {
        self.scheduler.advance(Duration::from_secs(secs));
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A rendered order-tracking page and the view-scoped URLs its script uses.
pub struct TrackingPage {
    pub body: String,
    pub status_path: String,
    pub close_path: String,
}

impl TrackingPage {
    fn parse(body: String) -> Self {
        let status_path = attribute(&body, "data-status-url").expect("status url on page");
        let close_path = attribute(&body, "data-close-url").expect("close url on page");
        Self {
            body,
            status_path,
            close_path,
        }
    }
}

/// Value of the first `name="..."` attribute in an HTML body.
#[must_use]
pub fn attribute(body: &str, name: &str) -> Option<String> {
    let marker = format!(r#"{name}=""#);
    let start = body.find(&marker)? + marker.len();
    let rest = body.get(start..)?;
    rest.find('"')
        .and_then(|end| rest.get(..end))
        .map(ToString::to_string)
}

/// A complete, valid checkout submission.
pub const VALID_CHECKOUT: &[(&str, &str)] = &[
    ("fullName", "Jane Doe"),
    ("address", "123 Main St"),
    ("city", "Anytown"),
    ("postalCode", "12345"),
    ("country", "USA"),
    ("paymentMethod", "paypal"),
    ("agreeToTerms", "on"),
];

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}
