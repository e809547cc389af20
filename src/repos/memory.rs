/*
 * Responsibility
 * - DATABASE_URL が無い環境 (ローカル / テスト) 用の in-memory repo
 * - 起動時に一度だけ構築し、以降は読み取り専用
 */
use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;

use crate::repos::{
    card_repo::{Card, CardRepo},
    error::RepoError,
    strategy_repo::{Strategy, StrategyRepo},
};
use crate::services::access_guard;

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    strategies: Vec<Strategy>,
    #[serde(default)]
    cards: Vec<Card>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    strategies: Arc<Vec<Strategy>>,
    cards: Arc<HashMap<String, Card>>,
}

impl MemoryRepo {
    pub fn new(strategies: Vec<Strategy>, cards: Vec<Card>) -> Self {
        let mut strategies = strategies;
        strategies.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let cards = cards.into_iter().map(|c| (c.id.clone(), c)).collect();

        Self {
            strategies: Arc::new(strategies),
            cards: Arc::new(cards),
        }
    }

    pub async fn from_seed_file(path: &Path) -> Result<Self, RepoError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|source| RepoError::SeedRead {
                path: path.to_path_buf(),
                source,
            })?;

        let seed: SeedFile =
            serde_json::from_slice(&raw).map_err(|source| RepoError::SeedFormat {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::new(seed.strategies, seed.cards))
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }
}

#[async_trait]
impl StrategyRepo for MemoryRepo {
    async fn get_by_id(&self, id: &str) -> Result<Option<Strategy>, RepoError> {
        Ok(self.strategies.iter().find(|s| s.id == id).cloned())
    }

    async fn get_by_owner_id(&self, owner_id: &str) -> Result<Vec<Strategy>, RepoError> {
        Ok(access_guard::owned_by(
            self.strategies.iter().cloned(),
            owner_id,
        ))
    }

    async fn get_by_thread_id(&self, thread_id: &str) -> Result<Option<Strategy>, RepoError> {
        // sorted newest first, so the first hit is the latest
        Ok(self
            .strategies
            .iter()
            .find(|s| s.thread_id.as_deref() == Some(thread_id))
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<Strategy>, RepoError> {
        Ok(self.strategies.as_ref().clone())
    }
}

#[async_trait]
impl CardRepo for MemoryRepo {
    async fn get_by_id(&self, id: &str) -> Result<Option<Card>, RepoError> {
        Ok(self.cards.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn strategy(id: &str, owner: Option<&str>, thread: Option<&str>, hour: u32) -> Strategy {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap();
        Strategy {
            id: id.to_string(),
            owner_id: owner.map(str::to_string),
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

    #[tokio::test]
    async fn lists_by_owner_newest_first() {
        let repo = MemoryRepo::new(
            vec![
                strategy("s1", Some("u1"), None, 1),
                strategy("s2", Some("u2"), None, 2),
                strategy("s3", Some("u1"), None, 3),
            ],
            vec![],
        );

        let mine = repo.get_by_owner_id("u1").await.unwrap();
        let ids: Vec<_> = mine.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(ids, ["s3", "s1"]);
    }

    #[tokio::test]
    async fn thread_lookup_returns_latest_strategy() {
        let repo = MemoryRepo::new(
            vec![
                strategy("old", Some("u1"), Some("t1"), 1),
                strategy("new", Some("u1"), Some("t1"), 5),
                strategy("other", Some("u1"), Some("t2"), 9),
            ],
            vec![],
        );

        let found = repo.get_by_thread_id("t1").await.unwrap().unwrap();
        assert_eq!(found.id, "new");
        assert!(repo.get_by_thread_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seed_file_applies_document_defaults() {
        let dir = std::env::temp_dir().join(format!("strategy-api-seed-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("seed.json");
        tokio::fs::write(
            &path,
            r#"{
                "strategies": [{
                    "id": "s1",
                    "name": "Momentum",
                    "attachments": [{"card_id": "c1", "role": "entry"}],
                    "created_at": "2026-01-01T00:00:00Z",
                    "updated_at": "2026-01-02T00:00:00Z"
                }],
                "cards": [{
                    "id": "c1",
                    "type": "indicator",
                    "created_at": "2026-01-01T00:00:00Z",
                    "updated_at": "2026-01-01T00:00:00Z"
                }]
            }"#,
        )
        .await
        .unwrap();

        let repo = MemoryRepo::from_seed_file(&path).await.unwrap();
        let s = StrategyRepo::get_by_id(&repo, "s1").await.unwrap().unwrap();

        assert_eq!(s.status, "draft");
        assert_eq!(s.version, 1);
        assert!(s.owner_id.is_none());
        assert!(s.attachments[0].enabled);
        assert!(s.attachments[0].overrides.is_empty());

        let card = CardRepo::get_by_id(&repo, "c1").await.unwrap().unwrap();
        assert_eq!(card.card_type, "indicator");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_seed_file_is_reported() {
        let dir = std::env::temp_dir().join(format!("strategy-api-bad-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("seed.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = MemoryRepo::from_seed_file(&path).await.unwrap_err();
        assert!(matches!(err, RepoError::SeedFormat { .. }));

        let err = MemoryRepo::from_seed_file(&dir.join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::SeedRead { .. }));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
