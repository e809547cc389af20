/*
 * Responsibility
 * - HTTP 層の公開ポイント (router() のみ)
 * - /health は /api の外に置く
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;


use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", routes::routes())
        .with_state(state)
}
