/*
 * Responsibility
 * - /threads 系 handler
 * - thread は strategy.thread_id から導出 (1 thread = 最新の strategy 1 件)
 */
use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::{
        dto::threads::ThreadResponse,
        extractors::{ListScope, MaybeAuthCtx},
    },
    error::AppError,
    repos::Strategy,
    services::access_guard,
    state::AppState,
};

pub async fn list_threads(
    State(state): State<AppState>,
    scope: ListScope,
) -> Result<Json<Vec<ThreadResponse>>, AppError> {
    let strategies = match scope {
        ListScope::Owner(caller) => state.strategies.get_by_owner_id(caller.as_str()).await?,
        ListScope::Everything => state.strategies.get_all().await?,
    };

    Ok(Json(summarize_threads(&strategies)))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    caller: MaybeAuthCtx,
) -> Result<Json<ThreadResponse>, AppError> {
    let strategy = state
        .strategies
        .get_by_thread_id(&thread_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Thread not found: {thread_id}")))?;

    access_guard::check(strategy.owner_id.as_deref(), caller.caller())
        .into_result()
        .map_err(|reason| AppError::denied(reason, "thread"))?;

    let thread = ThreadResponse::from_strategy(&strategy)
        .ok_or_else(|| AppError::not_found(format!("Thread not found: {thread_id}")))?;

    Ok(Json(thread))
}

/// One entry per thread (latest `updated_at` wins), newest first.
pub(crate) fn summarize_threads(strategies: &[Strategy]) -> Vec<ThreadResponse> {
    let mut latest: HashMap<String, ThreadResponse> = HashMap::new();

    for thread in strategies.iter().filter_map(ThreadResponse::from_strategy) {
        match latest.get(&thread.thread_id) {
            Some(existing) if existing.updated_at >= thread.updated_at => {}
            _ => {
                latest.insert(thread.thread_id.clone(), thread);
            }
        }
    }

    let mut threads: Vec<_> = latest.into_values().collect();
    threads.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.thread_id.cmp(&b.thread_id))
    });
    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn strategy(id: &str, thread: Option<&str>, hour: u32) -> Strategy {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap();
        Strategy {
            id: id.to_string(),
            owner_id: Some("u1".to_string()),
            thread_id: thread.map(str::to_string),
            name: format!("strategy {id}"),
            status: "draft".to_string(),
            universe: vec![],
            attachments: vec![],
            version: 1,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn keeps_latest_strategy_per_thread() {
        let threads = summarize_threads(&[
            strategy("s1", Some("t1"), 1),
            strategy("s2", Some("t1"), 4),
            strategy("s3", Some("t1"), 2),
        ]);

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].strategy_id, "s2");
    }

    #[test]
    fn sorted_newest_first_and_skips_unlinked() {
        let threads = summarize_threads(&[
            strategy("s1", Some("t1"), 1),
            strategy("s2", None, 9),
            strategy("s3", Some("t2"), 5),
            strategy("s4", Some(""), 7),
        ]);

        let ids: Vec<_> = threads.iter().map(|t| t.thread_id.as_str()).collect();
        assert_eq!(ids, ["t2", "t1"]);
    }
}
