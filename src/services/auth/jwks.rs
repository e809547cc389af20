//! Signing-key lookup for identity-provider tokens.
//!
//! `JwksKeySource` fetches the provider's published JWKS over HTTPS and keeps the
//! parsed keys in-process for a TTL. Provider keys rotate, so an unknown `kid`
//! triggers one refetch (rate limited by `MIN_REFETCH_INTERVAL`).
//!
//! Refreshes are single flight: concurrent misses wait on one fetch. A failed
//! fetch is remembered for `MIN_REFETCH_INTERVAL`, so a provider outage costs
//! one request per interval instead of one per incoming token.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use url::Url;

use super::AuthError;

const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("signing keys unavailable: {0}")]
    Unavailable(String),
    #[error("unknown signing key '{0}'")]
    UnknownKey(String),
}

impl From<KeySourceError> for AuthError {
    fn from(e: KeySourceError) -> Self {
        match e {
            KeySourceError::Unavailable(_) => AuthError::misconfigured(e.to_string()),
            KeySourceError::UnknownKey(_) => AuthError::unauthorized(format!("Invalid token: {e}")),
        }
    }
}

#[async_trait]
pub trait KeySource: Send + Sync {
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, KeySourceError>;
}

/// Keys from a JWKS document, by `kid`. Keys without a `kid` or with unsupported
/// parameters are skipped.
pub fn decoding_keys(set: &JwkSet) -> HashMap<String, DecodingKey> {
    set.keys
        .iter()
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(e) => {
                    warn!(%kid, error = %e, "skipping unusable jwk");
                    None
                }
            }
        })
        .collect()
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

struct LastFailure {
    at: Instant,
    reason: String,
}

pub struct JwksKeySource {
    client: reqwest::Client,
    url: Url,
    ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
    // held for the duration of a fetch
    refresh: Mutex<Option<LastFailure>>,
}

impl std::fmt::Debug for JwksKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksKeySource")
            .field("url", &self.url.as_str())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwksKeySource {
    pub fn new(url: Url, ttl: Duration, timeout: Duration) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySourceError::Unavailable(format!("http client: {e}")))?;

        Ok(Self {
            client,
            url,
            ttl,
            cache: RwLock::new(None),
            refresh: Mutex::new(None),
        })
    }

    /// Answer from the cache if it may be trusted. `None` means a fetch is due.
    async fn cached(&self, kid: &str) -> Option<Result<DecodingKey, KeySourceError>> {
        let cache = self.cache.read().await;
        let cached = cache.as_ref()?;
        let age = cached.fetched_at.elapsed();
        if age >= self.ttl {
            return None;
        }
        match cached.keys.get(kid) {
            Some(key) => Some(Ok(key.clone())),
            None if age < MIN_REFETCH_INTERVAL => {
                Some(Err(KeySourceError::UnknownKey(kid.to_string())))
            }
            None => None,
        }
    }

    async fn fetch(&self) -> Result<HashMap<String, DecodingKey>, KeySourceError> {
        let unavailable = |e: reqwest::Error| KeySourceError::Unavailable(e.to_string());

        let set: JwkSet = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        let keys = decoding_keys(&set);
        if keys.is_empty() {
            return Err(KeySourceError::Unavailable(
                "JWKS contains no usable keys".to_string(),
            ));
        }

        debug!(url = %self.url, count = keys.len(), "fetched signing keys");
        Ok(keys)
    }
}

#[async_trait]
impl KeySource for JwksKeySource {
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, KeySourceError> {
        if let Some(found) = self.cached(kid).await {
            return found;
        }

        let mut last_failure = self.refresh.lock().await;
        // another caller may have refreshed while we waited
        if let Some(found) = self.cached(kid).await {
            return found;
        }
        if let Some(failure) = last_failure.as_ref()
            && failure.at.elapsed() < MIN_REFETCH_INTERVAL
        {
            return Err(KeySourceError::Unavailable(failure.reason.clone()));
        }

        let keys = match self.fetch().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(url = %self.url, error = %e, "signing key refresh failed");
                let reason = match &e {
                    KeySourceError::Unavailable(reason) => reason.clone(),
                    other => other.to_string(),
                };
                *last_failure = Some(LastFailure {
                    at: Instant::now(),
                    reason,
                });
                return Err(e);
            }
        };
        *last_failure = None;

        let key = keys.get(kid).cloned();
        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| KeySourceError::UnknownKey(kid.to_string()))
    }
}

/// Fixed key set for tests.
#[cfg(test)]
pub(crate) struct StaticKeySource {
    keys: HashMap<String, DecodingKey>,
    unavailable: bool,
}

#[cfg(test)]
impl StaticKeySource {
    pub(crate) fn new(keys: HashMap<String, DecodingKey>) -> Self {
        Self {
            keys,
            unavailable: false,
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            keys: HashMap::new(),
            unavailable: true,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl KeySource for StaticKeySource {
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, KeySourceError> {
        if self.unavailable {
            return Err(KeySourceError::Unavailable("key source offline".to_string()));
        }
        self.keys
            .get(kid)
            .cloned()
            .ok_or_else(|| KeySourceError::UnknownKey(kid.to_string()))
    }
}
