/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - verifier: TokenVerifier, strategies / cards: repository, list_policy
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::config::ListPolicy;
use crate::repos::{CardRepo, StrategyRepo};
use crate::services::auth::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub strategies: Arc<dyn StrategyRepo>,
    pub cards: Arc<dyn CardRepo>,
    pub list_policy: ListPolicy,
}

impl AppState {
    pub fn new(
        verifier: Arc<TokenVerifier>,
        strategies: Arc<dyn StrategyRepo>,
        cards: Arc<dyn CardRepo>,
        list_policy: ListPolicy,
    ) -> Self {
        Self {
            verifier,
            strategies,
            cards,
            list_policy,
        }
    }
}
