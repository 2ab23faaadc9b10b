/*
 * Responsibility
 * - GET /api/admin/summary (ADMIN only)
 * - Role checks live in handlers; the gate only authenticates
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::extractors::Principal;
use crate::error::AppError;
use crate::services::auth::UserRole;

pub async fn summary(Principal(claims): Principal) -> Result<Json<Value>, AppError> {
    claims.require_role(&[UserRole::Admin])?;

    Ok(Json(json!({
        "requested_by": claims.sub,
        "role": claims.role,
    })))
}
