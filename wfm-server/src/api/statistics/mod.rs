//! Statistics API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/statistics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/overview", get(handler::overview))
        .route(
            "/employees-by-department",
            get(handler::employees_by_department),
        )
        .route("/attendance", get(handler::attendance))
        .route("/leaves", get(handler::leaves))
        .route("/tasks", get(handler::tasks))
        .route("/team-performance", get(handler::team_performance))
}
