/*
 * Responsibility
 * - Strategies の response DTO
 * - card は attachment の role / enabled / overrides をマージして返す
 */
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::repos::{Attachment, Card, Strategy};

#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub card_id: String,
    pub role: String,
    pub enabled: bool,
    pub overrides: Map<String, Value>,
}

impl From<Attachment> for AttachmentResponse {
    fn from(a: Attachment) -> Self {
        Self {
            card_id: a.card_id,
            role: a.role,
            enabled: a.enabled,
            overrides: a.overrides,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StrategyResponse {
    pub id: String,
    pub owner_id: Option<String>,
    pub thread_id: Option<String>,
    pub name: String,
    pub status: String,
    pub universe: Vec<String>,
    pub attachments: Vec<AttachmentResponse>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Strategy> for StrategyResponse {
    fn from(s: Strategy) -> Self {
        Self {
            id: s.id,
            owner_id: s.owner_id,
            thread_id: s.thread_id,
            name: s.name,
            status: s.status,
            universe: s.universe,
            attachments: s.attachments.into_iter().map(Into::into).collect(),
            version: s.version,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: String,
    pub owner_id: Option<String>,
    #[serde(rename = "type")]
    pub card_type: String,
    pub slots: Map<String, Value>,
    pub schema_etag: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // from the attachment
    pub role: String,
    pub enabled: bool,
    pub overrides: Map<String, Value>,
}

impl CardResponse {
    pub fn attached(card: Card, attachment: &Attachment) -> Self {
        Self {
            id: card.id,
            owner_id: card.owner_id,
            card_type: card.card_type,
            slots: card.slots,
            schema_etag: card.schema_etag,
            created_at: card.created_at,
            updated_at: card.updated_at,
            role: attachment.role.clone(),
            enabled: attachment.enabled,
            overrides: attachment.overrides.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StrategyWithCardsResponse {
    pub strategy: StrategyResponse,
    pub cards: Vec<CardResponse>,
    pub card_count: usize,
}

impl StrategyWithCardsResponse {
    pub fn new(strategy: Strategy, cards: Vec<CardResponse>) -> Self {
        Self {
            strategy: strategy.into(),
            card_count: cards.len(),
            cards,
        }
    }
}
