//! API route modules
//!
//! One module per resource, each exposing `router()` and keeping its
//! handlers in `handler.rs`. Every route except the public auth entry
//! points and `/health` sits behind the bearer-token middleware.

pub mod attendance;
pub mod auth;
pub mod conversations;
pub mod health;
pub mod leaves;
pub mod messages;
pub mod notifications;
pub mod statistics;
pub mod tasks;
pub mod teams;
pub mod users;

use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::require_auth;
use crate::core::ServerState;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(teams::router())
        .merge(attendance::router())
        .merge(leaves::router())
        .merge(tasks::router())
        .merge(conversations::router())
        .merge(messages::router())
        .merge(notifications::router())
        .merge(statistics::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Common pagination query parameters: `page` (1-based, default 1) and
/// `page_size` (default 20)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(20).max(1)
    }
}
