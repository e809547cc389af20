use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::{AuthError, CallerIdentity, IdentityClaims, TokenStrategy};

/// HS256 verifier for NextAuth-issued session tokens.
///
/// - Signature and `exp` are checked by `jsonwebtoken`.
/// - NextAuth tokens carry no fixed `aud`/`iss`, so those are not validated.
/// - Debug output omits key material.
#[derive(Clone)]
pub struct NextAuthVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for NextAuthVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("NextAuthVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl NextAuthVerifier {
    pub fn new(secret: &str, leeway_seconds: u64) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::misconfigured("NEXTAUTH_SECRET is empty"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    // Verify signature + expiry and decode the identity claims.
    pub fn decode(&self, token: &str) -> Result<IdentityClaims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[async_trait]
impl TokenStrategy for NextAuthVerifier {
    fn name(&self) -> &'static str {
        "nextauth"
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }

    async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let claims = self.decode(token)?;
        claims.identity()
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::{Value, json};

    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes";

    fn sign(claims: &Value, secret: &str, alg: Algorithm) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn verifier() -> NextAuthVerifier {
        NextAuthVerifier::new(SECRET, 0).unwrap()
    }

    #[tokio::test]
    async fn valid_token_yields_subject() {
        let token = sign(&json!({"sub": "user-123", "exp": in_one_hour()}), SECRET, Algorithm::HS256);

        let identity = verifier().verify(&token).await.unwrap();

        assert_eq!(identity.as_str(), "user-123");
    }

    #[tokio::test]
    async fn nested_user_id_is_accepted() {
        let token = sign(
            &json!({"user": {"id": "user-9", "email": "a@b.c"}, "exp": in_one_hour()}),
            SECRET,
            Algorithm::HS256,
        );

        let identity = verifier().verify(&token).await.unwrap();

        assert_eq!(identity.as_str(), "user-9");
    }

    #[tokio::test]
    async fn expired_token_reports_expiry() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = sign(&json!({"sub": "user-123", "exp": exp}), SECRET, Algorithm::HS256);

        let err = verifier().verify(&token).await.unwrap_err();

        assert_eq!(err, AuthError::unauthorized("Token has expired"));
    }

    #[tokio::test]
    async fn leeway_tolerates_small_clock_skew() {
        let exp = chrono::Utc::now().timestamp() - 10;
        let token = sign(&json!({"sub": "user-123", "exp": exp}), SECRET, Algorithm::HS256);

        let verifier = NextAuthVerifier::new(SECRET, 60).unwrap();

        assert!(verifier.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_token() {
        let token = sign(
            &json!({"sub": "user-123", "exp": in_one_hour()}),
            "another-secret-key-of-some-length",
            Algorithm::HS256,
        );

        let err = verifier().verify(&token).await.unwrap_err();

        assert!(matches!(err, AuthError::Unauthorized(ref m) if m.starts_with("Invalid token")));
    }

    #[tokio::test]
    async fn other_algorithm_is_rejected() {
        let token = sign(&json!({"sub": "user-123", "exp": in_one_hour()}), SECRET, Algorithm::HS512);

        let err = verifier().verify(&token).await.unwrap_err();

        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn missing_exp_is_rejected() {
        let token = sign(&json!({"sub": "user-123"}), SECRET, Algorithm::HS256);

        let err = verifier().verify(&token).await.unwrap_err();

        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn payload_without_identity_is_rejected() {
        let token = sign(&json!({"email": "a@b.c", "exp": in_one_hour()}), SECRET, Algorithm::HS256);

        let err = verifier().verify(&token).await.unwrap_err();

        assert!(matches!(err, AuthError::Unauthorized(ref m) if m.contains("user identifier")));
    }

    #[tokio::test]
    async fn corrupted_signature_is_rejected() {
        let token = sign(&json!({"sub": "user-123", "exp": in_one_hour()}), SECRET, Algorithm::HS256);
        let (head, _) = token.rsplit_once('.').unwrap();
        let corrupted = format!("{head}.@@not-base64@@");

        let err = verifier().verify(&corrupted).await.unwrap_err();

        assert!(err.is_unauthorized());
    }

    #[test]
    fn empty_secret_is_misconfiguration() {
        let err = NextAuthVerifier::new("  ", 0).unwrap_err();
        assert!(matches!(err, AuthError::ServerMisconfigured(_)));
    }
}
