/*
 * Responsibility
 * - Card ドキュメントの型と repository trait
 * - Strategy の attachments から card_id で引く用途のみ
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default)]
    pub slots: Map<String, Value>,
    #[serde(default)]
    pub schema_etag: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait CardRepo: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Card>, RepoError>;
}
