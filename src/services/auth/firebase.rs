use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;
use serde_json::Value;

use super::{AuthError, CallerIdentity, IdentityClaims, KeySource, TokenStrategy};

pub const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

// Firebase uid length limit.
const MAX_UID_LEN: usize = 128;

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    iat: i64,
    #[serde(default)]
    auth_time: Option<i64>,
    #[serde(flatten)]
    identity: IdentityClaims,
}

/// Firebase ID token verifier.
///
/// `jsonwebtoken::Validation` checks signature, `exp`, `aud` (= project id) and
/// `iss` (= securetoken issuer for the project). This type additionally checks:
/// - header `alg` is RS256 and carries a `kid` known to the key source
/// - `iat` / `auth_time` are not in the future
/// - `sub` is a non-empty string of at most 128 chars
pub struct FirebaseVerifier {
    project_id: String,
    keys: Arc<dyn KeySource>,
    validation: Validation,
    leeway_seconds: u64,
}

impl std::fmt::Debug for FirebaseVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseVerifier")
            .field("project_id", &self.project_id)
            .field("validation", &self.validation)
            .finish()
    }
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>, keys: Arc<dyn KeySource>, leeway_seconds: u64) -> Self {
        let project_id = project_id.into();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id.as_str()]);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{project_id}")]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            project_id,
            keys,
            validation,
            leeway_seconds,
        }
    }

    fn check_times(&self, claims: &FirebaseClaims) -> Result<(), AuthError> {
        let latest = chrono::Utc::now().timestamp() + self.leeway_seconds as i64;

        if claims.iat > latest {
            return Err(AuthError::unauthorized("Invalid token: issued in the future"));
        }
        if claims.auth_time.is_some_and(|t| t > latest) {
            return Err(AuthError::unauthorized(
                "Invalid token: authenticated in the future",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStrategy for FirebaseVerifier {
    fn name(&self) -> &'static str {
        "firebase"
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::RS256
    }

    async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let header = jsonwebtoken::decode_header(token)?;
        if header.alg != self.algorithm() {
            return Err(AuthError::unauthorized(format!(
                "Invalid token: expected RS256, got {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::unauthorized("Invalid token: missing 'kid' header"))?;

        let key = self.keys.key_for(&kid).await?;
        let claims = jsonwebtoken::decode::<FirebaseClaims>(token, &key, &self.validation)?.claims;

        self.check_times(&claims)?;

        match &claims.identity.sub {
            Some(Value::String(sub)) if !sub.is_empty() && sub.chars().count() <= MAX_UID_LEN => {}
            _ => {
                return Err(AuthError::unauthorized(
                    "Invalid token: 'sub' must be a non-empty string of at most 128 characters",
                ));
            }
        }

        claims.identity.identity()
    }
}
