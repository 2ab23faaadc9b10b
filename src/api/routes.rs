/*
 * Responsibility
 * - URL structure under /api
 * - The route policy table, declared next to the routes it describes
 *   (keys are the full route templates the router reports as MatchedPath)
 */
use axum::{Router, http::Method, routing::get};

use crate::api::handlers::{admin, health, parcels, users};
use crate::services::auth::RoutePolicyTable;
use crate::state::AppState;

pub const API_PREFIX: &str = "/api";

const HEALTH: &str = "/health";
const USERS_ME: &str = "/users/me";
const ADMIN_SUMMARY: &str = "/admin/summary";
const PARCELS: &str = "/parcels";
const TRACKING: &str = "/tracking/{code}";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(HEALTH, get(health::health))
        .route(USERS_ME, get(users::me))
        .route(ADMIN_SUMMARY, get(admin::summary))
        .route(PARCELS, get(parcels::list))
        .route(TRACKING, get(parcels::track))
}

pub fn policies() -> RoutePolicyTable {
    let full = |path: &str| format!("{API_PREFIX}{path}");

    RoutePolicyTable::builder()
        .resource("health", true)
        .resource("parcels", false)
        .route(Method::GET, full(HEALTH), "health", None)
        .route(Method::GET, full(USERS_ME), "users", None)
        .route(Method::GET, full(ADMIN_SUMMARY), "admin", None)
        .route(Method::GET, full(PARCELS), "parcels", None)
        // tracking links are shared with recipients who have no account
        .route(Method::GET, full(TRACKING), "parcels", Some(true))
        .build()
}
