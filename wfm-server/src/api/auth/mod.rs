//! Authentication API module
//!
//! `/auth/register`, `/auth/login` and `/auth/refresh` are public; the
//! rest requires a valid access token. Reset and active-flag toggles are
//! restricted to HR managers in the handlers.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/refresh", post(handler::refresh))
        .route("/change-password", post(handler::change_password))
        .route("/force-reset-password", post(handler::force_reset_password))
        .route("/deactivate", post(handler::deactivate))
        .route("/reactivate", post(handler::reactivate))
}
