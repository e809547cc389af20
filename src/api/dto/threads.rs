/*
 * Responsibility
 * - Threads の response DTO
 * - thread は保存されず、thread_id を持つ strategy から導出する
 */
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::repos::Strategy;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub strategy_id: String,
    pub strategy_name: String,
    pub strategy_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ThreadResponse {
    /// `None` if the strategy is not linked to a thread.
    pub fn from_strategy(s: &Strategy) -> Option<Self> {
        let thread_id = s.thread_id.clone().filter(|t| !t.is_empty())?;

        Some(Self {
            thread_id,
            strategy_id: s.id.clone(),
            strategy_name: s.name.clone(),
            strategy_status: s.status.clone(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        })
    }
}
