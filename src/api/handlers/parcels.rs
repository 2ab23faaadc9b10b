/*
 * Responsibility
 * - GET /api/parcels: the caller's parcels (protected)
 * - GET /api/tracking/{code}: public tracking lookup inside the protected parcels resource
 * - Storage is an external collaborator; these handlers only shape responses
 */
use axum::{Json, extract::Path};
use serde_json::{Value, json};

use crate::api::extractors::Principal;
use crate::error::AppError;

pub async fn list(Principal(claims): Principal) -> Json<Value> {
    Json(json!({
        "owner": claims.sub,
        "role": claims.role,
        "parcels": [],
    }))
}

pub async fn track(Path(code): Path<String>) -> Result<Json<Value>, AppError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::not_found("parcel"));
    }

    Ok(Json(json!({
        "tracking_code": code,
        "status": "UNKNOWN",
    })))
}
