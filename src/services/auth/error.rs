use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use thiserror::Error;

/// Every way the gate can reject a protected request.
///
/// The `Display` text is the exact message returned to callers; clients match on it
/// (e.g. "Token has expired" triggers a silent refresh).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Access token is required")]
    MissingCredential,
    #[error("Invalid token format")]
    MalformedToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Invalid token structure")]
    InvalidClaims,
}

impl AuthError {
    /// Expected outcomes of normal client behaviour, logged below error severity.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::ExpiredToken)
    }

    /// Stable identifier for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedToken => "malformed_token",
            Self::ExpiredToken => "expired_token",
            Self::InvalidToken => "invalid_token",
            Self::InvalidClaims => "invalid_claims",
        }
    }
}

/// Map a jsonwebtoken failure onto the closed taxonomy.
///
/// `ErrorKind` is non-exhaustive: anything not listed falls through to `InvalidToken`.
pub fn classify(err: &JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::MalformedToken,
        ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        _ => AuthError::InvalidToken,
    }
}
