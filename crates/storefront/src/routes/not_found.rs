//! Fallback for unknown routes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    http::{StatusCode, Uri},
    response::IntoResponse,
};

use super::Layout;
use crate::filters;
use crate::middleware::{CurrentCart, RequestId};

/// Page not found template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
    pub request_id: String,
}

/// Render the 404 page for any unmatched path.
pub async fn not_found(
    current: CurrentCart,
    uri: Uri,
    request_id: Option<Extension<RequestId>>,
) -> impl IntoResponse {
    let request_id = request_id
        .map(|Extension(RequestId(id))| id)
        .unwrap_or_default();
    tracing::info!(path = %uri.path(), request_id = %request_id, "page not found");

    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            layout: Layout::new(&current),
            request_id,
        },
    )
}
