//! Shared fixtures for router and handler tests.

use std::{sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value, json};

use crate::config::ListPolicy;
use crate::repos::{Attachment, Card, MemoryRepo, Strategy};
use crate::services::auth::{NextAuthVerifier, TokenStrategy, TokenVerifier};
use crate::state::AppState;

pub const SECRET: &str = "router-test-secret";

pub fn hs256_token(claims: &Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn token_for(sub: &str) -> String {
    hs256_token(&json!({ "sub": sub, "exp": Utc::now().timestamp() + 3600 }))
}

pub fn expired_token_for(sub: &str) -> String {
    hs256_token(&json!({ "sub": sub, "exp": Utc::now().timestamp() - 3600 }))
}

fn strategy(
    id: &str,
    owner: Option<&str>,
    thread: Option<&str>,
    hour: u32,
    attachments: Vec<Attachment>,
) -> Strategy {
    let at = Utc.with_ymd_and_hms(2026, 2, 1, hour, 0, 0).unwrap();
    Strategy {
        id: id.to_string(),
        owner_id: owner.map(str::to_string),
        thread_id: thread.map(str::to_string),
        name: format!("strategy {id}"),
        status: "active".to_string(),
        universe: vec!["AAPL".to_string(), "MSFT".to_string()],
        attachments,
        version: 1,
        created_at: at,
        updated_at: at,
    }
}

fn attachment(card_id: &str, role: &str, enabled: bool) -> Attachment {
    let mut overrides = Map::new();
    if enabled {
        overrides.insert("period".to_string(), json!(20));
    }
    Attachment {
        card_id: card_id.to_string(),
        role: role.to_string(),
        enabled,
        overrides,
    }
}

/// - s-u1 (owner u1, thread t1, 1 live card + 1 dangling attachment)
/// - s-u1-old (owner u1, thread t1, older)
/// - s-u1-solo (owner u1, no thread)
/// - s-public (no owner, thread t2)
/// - s-u2 (owner u2, thread t3)
pub fn fixture_repo() -> MemoryRepo {
    let card_at = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
    let mut slots = Map::new();
    slots.insert("period".to_string(), json!(14));

    let cards = vec![Card {
        id: "c1".to_string(),
        owner_id: Some("u1".to_string()),
        card_type: "indicator".to_string(),
        slots,
        schema_etag: Some("etag-1".to_string()),
        created_at: card_at,
        updated_at: card_at,
    }];

    let strategies = vec![
        strategy(
            "s-u1",
            Some("u1"),
            Some("t1"),
            10,
            vec![attachment("c1", "entry", true), attachment("c-gone", "exit", false)],
        ),
        strategy("s-u1-old", Some("u1"), Some("t1"), 2, vec![]),
        strategy("s-u1-solo", Some("u1"), None, 12, vec![]),
        strategy("s-public", None, Some("t2"), 8, vec![]),
        strategy("s-u2", Some("u2"), Some("t3"), 9, vec![]),
    ];

    MemoryRepo::new(strategies, cards)
}

pub fn nextauth_verifier() -> Arc<TokenVerifier> {
    let nextauth: Arc<dyn TokenStrategy> = Arc::new(NextAuthVerifier::new(SECRET, 0).unwrap());
    Arc::new(TokenVerifier::new(vec![nextauth], Duration::from_secs(1)))
}

pub fn state_with(verifier: Arc<TokenVerifier>, list_policy: ListPolicy) -> AppState {
    let repo = Arc::new(fixture_repo());
    AppState::new(verifier, repo.clone(), repo, list_policy)
}

pub fn state(list_policy: ListPolicy) -> AppState {
    state_with(nextauth_verifier(), list_policy)
}
