//! Notification API module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/read-all", put(handler::mark_all_read))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/read", put(handler::mark_read))
}
