use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::AuthError;

/// Verified caller identifier. Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity-bearing subset of a token payload.
///
/// Values stay as `Value` because issuers disagree on types
/// (NextAuth may put a numeric `user.id`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub uid: Option<Value>,
    #[serde(default)]
    pub user: Option<Value>,
}

impl IdentityClaims {
    /// `sub`, then `uid`, then `user.id`.
    pub fn identity(&self) -> Result<CallerIdentity, AuthError> {
        let nested = self.user.as_ref().and_then(|u| u.get("id"));

        [self.sub.as_ref(), self.uid.as_ref(), nested]
            .into_iter()
            .flatten()
            .find_map(claim_to_id)
            .map(CallerIdentity)
            .ok_or_else(|| {
                AuthError::unauthorized("Invalid token: no user identifier (sub, uid or user.id)")
            })
    }
}

fn claim_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
