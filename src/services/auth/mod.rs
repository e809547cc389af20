pub mod error;
pub mod factory;
pub mod firebase;
pub mod identity;
pub mod jwks;
pub mod nextauth;
pub mod strategy;
pub mod verifier;

pub use error::AuthError;
pub use factory::build_token_verifier;
pub use firebase::FirebaseVerifier;
pub use identity::{CallerIdentity, IdentityClaims};
pub use jwks::{JwksKeySource, KeySource};
pub use nextauth::NextAuthVerifier;
pub use strategy::TokenStrategy;
pub use verifier::TokenVerifier;
