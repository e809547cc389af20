use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::config::ListPolicy;
use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

use super::{AuthCtx, BearerToken, ListScope, MaybeAuthCtx};

/// `Authorization` header から bearer credentials を取り出す
/// scheme は大文字小文字を区別しない。それ以外の形は匿名 (None)
pub(crate) fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credentials) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let credentials = credentials.trim();
    (!credentials.is_empty()).then(|| credentials.to_string())
}

fn log_rejection(err: &AuthError) {
    // token 本体はログに出さない。backend 障害は AppError 変換時に error で出る
    if err.is_unauthorized() {
        tracing::warn!(error = %err, "access token verification failed");
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_from_headers(&parts.headers)))
    }
}

impl MaybeAuthCtx {
    pub async fn resolve(state: &AppState, token: &BearerToken) -> Result<Self, AppError> {
        let identity = state
            .verifier
            .verify(token.as_deref())
            .await
            .inspect_err(log_rejection)?;

        Ok(MaybeAuthCtx(identity.map(AuthCtx::new)))
    }
}

impl FromRequestParts<AppState> for MaybeAuthCtx {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = BearerToken(bearer_from_headers(&parts.headers));
        MaybeAuthCtx::resolve(state, &token).await
    }
}

impl ListScope {
    pub async fn resolve(state: &AppState, token: &BearerToken) -> Result<Self, AppError> {
        let scope = match state.list_policy {
            ListPolicy::RequireAuth => ListScope::Owner(
                state
                    .verifier
                    .verify_required(token.as_deref())
                    .await
                    .inspect_err(log_rejection)?,
            ),
            ListPolicy::AllowAnonymousAll => match state
                .verifier
                .verify(token.as_deref())
                .await
                .inspect_err(log_rejection)?
            {
                Some(identity) => ListScope::Owner(identity),
                None => ListScope::Everything,
            },
        };

        Ok(scope)
    }
}

impl FromRequestParts<AppState> for ListScope {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = BearerToken(bearer_from_headers(&parts.headers));
        ListScope::resolve(state, &token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_from_headers(&headers("Bearer a.b.c")).as_deref(), Some("a.b.c"));
        assert_eq!(bearer_from_headers(&headers("bearer a.b.c")).as_deref(), Some("a.b.c"));
        assert_eq!(bearer_from_headers(&headers("BEARER  a.b.c ")).as_deref(), Some("a.b.c"));
    }

    #[test]
    fn other_shapes_are_anonymous() {
        assert_eq!(bearer_from_headers(&HeaderMap::new()), None);
        assert_eq!(bearer_from_headers(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_from_headers(&headers("Bearer")), None);
        assert_eq!(bearer_from_headers(&headers("Bearer    ")), None);
    }
}
