//! Health check handler

use axum::Json;
use serde::Serialize;

use shared::{ApiResponse, AppResult};

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> AppResult<Json<ApiResponse<Health>>> {
    Ok(Json(ApiResponse::ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })))
}
