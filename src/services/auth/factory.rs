/// Factory: build the `TokenVerifier` chain from `AuthConfig`.
use std::sync::Arc;

use crate::config::{AuthBackend, AuthConfig};
use crate::services::auth::{
    AuthError, FirebaseVerifier, JwksKeySource, NextAuthVerifier, TokenStrategy, TokenVerifier,
};

pub fn build_token_verifier(config: &AuthConfig) -> Result<Arc<TokenVerifier>, AuthError> {
    let mut strategies: Vec<Arc<dyn TokenStrategy>> = Vec::with_capacity(config.backends.len());

    for backend in &config.backends {
        match backend {
            AuthBackend::NextAuth => {
                let secret = config
                    .nextauth_secret
                    .as_deref()
                    .ok_or_else(|| AuthError::misconfigured("NEXTAUTH_SECRET is not set"))?;
                strategies.push(Arc::new(NextAuthVerifier::new(
                    secret,
                    config.leeway_seconds,
                )?));
            }
            AuthBackend::Firebase => {
                let firebase = config
                    .firebase
                    .as_ref()
                    .ok_or_else(|| AuthError::misconfigured("FIREBASE_PROJECT_ID is not set"))?;
                let keys = JwksKeySource::new(
                    firebase.jwks_url.clone(),
                    firebase.jwks_cache_ttl,
                    config.provider_timeout,
                )?;
                strategies.push(Arc::new(FirebaseVerifier::new(
                    firebase.project_id.clone(),
                    Arc::new(keys),
                    config.leeway_seconds,
                )));
            }
        }
    }

    Ok(Arc::new(TokenVerifier::new(
        strategies,
        config.provider_timeout,
    )))
}
