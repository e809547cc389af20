use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{AuthError, CallerIdentity, TokenStrategy};

/// Bearer token verifier: an ordered chain of strategies.
///
/// - no token → anonymous (`Ok(None)`), never an error
/// - token → normalized, then tried against each strategy in order until one accepts it
/// - all strategies reject → one error is surfaced, by precedence:
///   1. `ServerMisconfigured` (backend outage / timeout) from any strategy
///   2. `Unauthorized` from the strategy whose algorithm matches the token header
///   3. otherwise the last strategy's error
pub struct TokenVerifier {
    strategies: Vec<Arc<dyn TokenStrategy>>,
    // Upper bound for a single strategy call (provider round-trips included).
    timeout: Duration,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("strategies", &self.strategy_names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(strategies: Vec<Arc<dyn TokenStrategy>>, timeout: Duration) -> Self {
        Self {
            strategies,
            timeout,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn verify(&self, token: Option<&str>) -> Result<Option<CallerIdentity>, AuthError> {
        let Some(raw) = token else {
            return Ok(None);
        };
        let token = normalize(raw)?;
        let token_alg = jsonwebtoken::decode_header(token).ok().map(|h| h.alg);

        let mut surfaced: Option<(Precedence, AuthError)> = None;
        for strategy in &self.strategies {
            let outcome = match tokio::time::timeout(self.timeout, strategy.verify(token)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(AuthError::misconfigured(format!(
                    "{} verification timed out after {:?}",
                    strategy.name(),
                    self.timeout
                ))),
            };

            match outcome {
                Ok(identity) => {
                    debug!(backend = strategy.name(), caller = %identity, "token verified");
                    return Ok(Some(identity));
                }
                Err(err) => {
                    debug!(backend = strategy.name(), error = %err, "token rejected");
                    let precedence = Precedence::of(&err, token_alg == Some(strategy.algorithm()));
                    if surfaced.as_ref().is_none_or(|(p, _)| precedence >= *p) {
                        surfaced = Some((precedence, err));
                    }
                }
            }
        }

        Err(surfaced.map(|(_, err)| err).unwrap_or_else(|| {
            AuthError::misconfigured("no token verification backend configured")
        }))
    }

    /// Same as `verify`, but an absent token is `Unauthorized`.
    pub async fn verify_required(&self, token: Option<&str>) -> Result<CallerIdentity, AuthError> {
        self.verify(token)
            .await?
            .ok_or_else(|| AuthError::unauthorized("Authentication required"))
    }
}

// Which rejection wins when every strategy fails. Ties go to the later strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Foreign,
    Owner,
    Outage,
}

impl Precedence {
    fn of(err: &AuthError, owns_token: bool) -> Self {
        match err {
            AuthError::ServerMisconfigured(_) => Precedence::Outage,
            AuthError::Unauthorized(_) if owns_token => Precedence::Owner,
            AuthError::Unauthorized(_) => Precedence::Foreign,
        }
    }
}

// Trim, then require the compact JWS shape (header.payload.signature).
fn normalize(raw: &str) -> Result<&str, AuthError> {
    let token = raw.trim();
    if token.split('.').count() != 3 {
        return Err(AuthError::unauthorized(
            "Invalid token: expected three dot-separated segments",
        ));
    }
    Ok(token)
}
