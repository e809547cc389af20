/*
 * Responsibility
 * - StrategyRepo / CardRepo の Postgres 実装 (読み取りのみ)
 * - 列は camelCase (quoted)、ネストした値は jsonb
 *
 * 想定スキーマ:
 *   strategies (id text PK, "ownerId" text NULL, "threadId" text NULL, name text,
 *               status text, universe jsonb, attachments jsonb, version int4,
 *               "createdAt" timestamptz, "updatedAt" timestamptz)
 *   cards      (id text PK, "ownerId" text NULL, type text, slots jsonb,
 *               "schemaEtag" text NULL, "createdAt" timestamptz, "updatedAt" timestamptz)
 */
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};

use crate::repos::{
    card_repo::{Card, CardRepo},
    error::RepoError,
    strategy_repo::{Attachment, Strategy, StrategyRepo},
};

#[derive(Debug, Clone, sqlx::FromRow)]
struct StrategyRow {
    id: String,

    #[sqlx(rename = "ownerId")]
    owner_id: Option<String>,

    #[sqlx(rename = "threadId")]
    thread_id: Option<String>,

    name: String,
    status: String,
    universe: Json<Vec<String>>,
    attachments: Json<Vec<Attachment>>,
    version: i32,

    #[sqlx(rename = "createdAt")]
    created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

impl From<StrategyRow> for Strategy {
    fn from(row: StrategyRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            thread_id: row.thread_id,
            name: row.name,
            status: row.status,
            universe: row.universe.0,
            attachments: row.attachments.0,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CardRow {
    id: String,

    #[sqlx(rename = "ownerId")]
    owner_id: Option<String>,

    #[sqlx(rename = "type")]
    card_type: String,

    slots: Json<Map<String, Value>>,

    #[sqlx(rename = "schemaEtag")]
    schema_etag: Option<String>,

    #[sqlx(rename = "createdAt")]
    created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

impl From<CardRow> for Card {
    fn from(row: CardRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            card_type: row.card_type,
            slots: row.slots.0,
            schema_etag: row.schema_etag,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgRepo {
    pool: PgPool,
}

impl PgRepo {
    pub async fn connect(database_url: &str) -> Result<Self, RepoError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StrategyRepo for PgRepo {
    async fn get_by_id(&self, id: &str) -> Result<Option<Strategy>, RepoError> {
        let row = sqlx::query_as::<_, StrategyRow>(
            r#"
            SELECT
                id, "ownerId", "threadId", name, status, universe, attachments,
                version, "createdAt", "updatedAt"
            FROM strategies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Strategy::from))
    }

    async fn get_by_owner_id(&self, owner_id: &str) -> Result<Vec<Strategy>, RepoError> {
        let rows = sqlx::query_as::<_, StrategyRow>(
            r#"
            SELECT
                id, "ownerId", "threadId", name, status, universe, attachments,
                version, "createdAt", "updatedAt"
            FROM strategies
            WHERE "ownerId" = $1
            ORDER BY "updatedAt" DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Strategy::from).collect())
    }

    async fn get_by_thread_id(&self, thread_id: &str) -> Result<Option<Strategy>, RepoError> {
        let row = sqlx::query_as::<_, StrategyRow>(
            r#"
            SELECT
                id, "ownerId", "threadId", name, status, universe, attachments,
                version, "createdAt", "updatedAt"
            FROM strategies
            WHERE "threadId" = $1
            ORDER BY "updatedAt" DESC
            LIMIT 1
            "#,
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Strategy::from))
    }

    async fn get_all(&self) -> Result<Vec<Strategy>, RepoError> {
        let rows = sqlx::query_as::<_, StrategyRow>(
            r#"
            SELECT
                id, "ownerId", "threadId", name, status, universe, attachments,
                version, "createdAt", "updatedAt"
            FROM strategies
            ORDER BY "updatedAt" DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Strategy::from).collect())
    }
}

#[async_trait]
impl CardRepo for PgRepo {
    async fn get_by_id(&self, id: &str) -> Result<Option<Card>, RepoError> {
        let row = sqlx::query_as::<_, CardRow>(
            r#"
            SELECT
                id, "ownerId", type, slots, "schemaEtag", "createdAt", "updatedAt"
            FROM cards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Card::from))
    }
}
