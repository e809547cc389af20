/*
 * Responsibility
 * - /strategies 系 handler (読み取りのみ)
 * - 一覧は list policy (ListScope)、単体取得は匿名可 + Access Guard
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    api::{
        dto::strategies::{CardResponse, StrategyResponse, StrategyWithCardsResponse},
        extractors::{BearerToken, ListScope, MaybeAuthCtx},
    },
    error::AppError,
    repos::Strategy,
    services::access_guard,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListStrategiesQuery {
    pub thread_id: Option<String>,
}

/// GET /strategies
/// - `?thread_id=` があればその thread の strategy (cards 付き) を返す
/// - 無ければ caller の strategy 一覧
pub async fn list_strategies(
    State(state): State<AppState>,
    Query(query): Query<ListStrategiesQuery>,
    token: BearerToken,
) -> Result<Response, AppError> {
    if let Some(thread_id) = query.thread_id.filter(|t| !t.is_empty()) {
        let caller = MaybeAuthCtx::resolve(&state, &token).await?;

        let strategy = state
            .strategies
            .get_by_thread_id(&thread_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Strategy not found for thread: {thread_id}")))?;

        authorize(&strategy, &caller)?;

        let res = with_cards(&state, strategy).await?;
        return Ok(Json(res).into_response());
    }

    let strategies = match ListScope::resolve(&state, &token).await? {
        ListScope::Owner(caller) => state.strategies.get_by_owner_id(caller.as_str()).await?,
        ListScope::Everything => state.strategies.get_all().await?,
    };

    let res: Vec<StrategyResponse> = strategies.into_iter().map(Into::into).collect();
    Ok(Json(res).into_response())
}

pub async fn get_strategy(
    State(state): State<AppState>,
    Path(strategy_id): Path<String>,
    caller: MaybeAuthCtx,
) -> Result<Json<StrategyWithCardsResponse>, AppError> {
    let strategy = state
        .strategies
        .get_by_id(&strategy_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Strategy not found: {strategy_id}")))?;

    authorize(&strategy, &caller)?;

    Ok(Json(with_cards(&state, strategy).await?))
}

fn authorize(strategy: &Strategy, caller: &MaybeAuthCtx) -> Result<(), AppError> {
    access_guard::check(strategy.owner_id.as_deref(), caller.caller())
        .into_result()
        .map_err(|reason| AppError::denied(reason, "strategy"))
}

async fn with_cards(
    state: &AppState,
    strategy: Strategy,
) -> Result<StrategyWithCardsResponse, AppError> {
    let mut cards = Vec::with_capacity(strategy.attachments.len());

    for attachment in &strategy.attachments {
        match state.cards.get_by_id(&attachment.card_id).await? {
            Some(card) => cards.push(CardResponse::attached(card, attachment)),
            None => tracing::debug!(
                strategy_id = %strategy.id,
                card_id = %attachment.card_id,
                "attached card not found, skipped"
            ),
        }
    }

    Ok(StrategyWithCardsResponse::new(strategy, cards))
}
