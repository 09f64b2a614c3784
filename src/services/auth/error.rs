use thiserror::Error;

/// Classified failures of the credential/authorization layer.
///
/// These carry enough detail for server-side logs. The HTTP boundary collapses
/// every credential failure into one generic 401 so callers cannot tell which
/// check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,

    #[error("malformed credential")]
    MalformedCredential,

    #[error("bad signature")]
    BadSignature,

    #[error("credential expired")]
    Expired,

    #[error("credential revoked")]
    Revoked,

    #[error("resource not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("internal: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for every kind the HTTP layer answers with 401.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredential
                | AuthError::MalformedCredential
                | AuthError::BadSignature
                | AuthError::Expired
                | AuthError::Revoked
        )
    }
}
