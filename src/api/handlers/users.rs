/*
 * Responsibility
 * - GET /api/users/me: echo the authenticated principal back to the client
 */
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::extractors::Principal;
use crate::services::auth::UserRole;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub expires_at: Option<DateTime<Utc>>,
}

pub async fn me(Principal(claims): Principal) -> Json<MeResponse> {
    Json(MeResponse {
        expires_at: DateTime::from_timestamp(claims.exp, 0),
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}
