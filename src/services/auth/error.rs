use thiserror::Error;

/// Token verification failures.
///
/// - `Unauthorized`: anything wrong with the caller's credential (401)
/// - `ServerMisconfigured`: the verification backend itself is unusable (500)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    ServerMisconfigured(String),
}

impl AuthError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::ServerMisconfigured(message.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => Self::unauthorized("Token has expired"),
            _ => Self::unauthorized(format!("Invalid token: {e}")),
        }
    }
}
