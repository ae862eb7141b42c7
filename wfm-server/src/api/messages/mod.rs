//! Message API module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/messages", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::send))
        .route("/{id}/read", put(handler::mark_read))
        .route(
            "/mark-conversation-read",
            post(handler::mark_conversation_read),
        )
}
