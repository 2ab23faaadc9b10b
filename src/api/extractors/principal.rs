use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AuthError, IdentityClaims};

/// Handler-side access to the authenticated principal.
///
/// The auth gate inserts `IdentityClaims` into request extensions; if they are
/// missing (public route, or the gate is not applied) the handler gets a 401.
#[derive(Debug, Clone)]
pub struct Principal(pub IdentityClaims);

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityClaims>()
            .cloned()
            .map(Principal)
            .ok_or(AppError::Unauthorized(AuthError::MissingCredential))
    }
}
