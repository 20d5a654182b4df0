//! Webhook router.
//!
//! Returns a composable `Router`. Layers (outermost → innermost):
//! audit logger → route-specific headers → handler.

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the webhook router with its shared context.
pub fn webhook_router(ctx: ApiContext) -> Router {
    // The export is a snapshot of a growing file; never cache it.
    let export = Router::new()
        .route("/export", get(endpoints::export::download))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(endpoints::health::root))
        .route("/health", get(endpoints::health::check))
        .route("/webhook", post(endpoints::webhook::fulfill))
        .merge(export)
        .fallback(|| async { ApiError::NotFound("No such route".into()) })
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}
