//! Webhook HTTP surface.
//!
//! `GET /` liveness, `GET /health` JSON status, `POST /webhook` fulfillment,
//! `GET /export` download of the unrecognized-query log. Every route passes
//! through the audit middleware.
//!
//! `webhook_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::webhook_router;
pub use server::{start_webhook_server_on, ServerError, WebhookServer};
pub use types::ApiContext;
