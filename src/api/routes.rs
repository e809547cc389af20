/*
 * Responsibility
 * - /api 配下の URL 構造を定義
 * - 認証は handler の extractor 単位で決める (匿名可 / list policy)
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::handlers::{
    strategies::{get_strategy, list_strategies},
    threads::{get_thread, list_threads},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/strategies", get(list_strategies))
        .route("/strategies/{strategy_id}", get(get_strategy))
        .route("/threads", get(list_threads))
        .route("/threads/{thread_id}", get(get_thread))
}
