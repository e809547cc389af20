use async_trait::async_trait;
use jsonwebtoken::Algorithm;

use super::{AuthError, CallerIdentity};

/// One verification backend in the verifier chain.
///
/// Implementations receive an already normalized token (trimmed, three segments).
#[async_trait]
pub trait TokenStrategy: Send + Sync {
    // Backend name (for logging).
    fn name(&self) -> &'static str;

    /// Signing algorithm this backend accepts. A token whose header names it is
    /// "owned" by this backend, and its rejection takes precedence in the chain.
    fn algorithm(&self) -> Algorithm;

    async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError>;
}
