/*
 * Responsibility
 * - Strategy ドキュメントの型と読み取り専用の repository trait
 * - owner_id は認可でのみ参照する (ここでは変更しない)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::repos::error::RepoError;
use crate::services::access_guard::Owned;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub card_id: String,
    pub role: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub overrides: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub name: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub universe: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default = "default_version")]
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> String {
    "draft".to_string()
}

fn default_version() -> i32 {
    1
}

impl Owned for Strategy {
    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }
}

#[async_trait]
pub trait StrategyRepo: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Strategy>, RepoError>;

    // Newest first.
    async fn get_by_owner_id(&self, owner_id: &str) -> Result<Vec<Strategy>, RepoError>;

    // Most recently updated strategy linked to the thread.
    async fn get_by_thread_id(&self, thread_id: &str) -> Result<Option<Strategy>, RepoError>;

    // Newest first.
    async fn get_all(&self) -> Result<Vec<Strategy>, RepoError>;
}
