//! Authentication gate: route policy lookup → bearer verification → principal in extensions.
//!
//! - Public routes (per `RoutePolicyTable`) pass through untouched; the header is not read.
//! - Everything else must carry a valid `Authorization: Bearer <jwt>`.
//! - On success the `IdentityClaims` are inserted into request extensions for the
//!   `Principal` extractor. On failure the request ends here with a 401.

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Apply the gate to every route already registered on `router`.
///
/// Uses `route_layer` so the matched route template is available and unmatched
/// paths still fall through to a plain 404.
///
/// ```ignore
/// let api = Router::new().nest("/api", api::routes());
/// let api = middleware::auth::access::apply(api, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let policy = match req.extensions().get::<MatchedPath>() {
        Some(path) => state.policies.lookup(req.method(), path.as_str()),
        None => Default::default(),
    };

    if policy.is_public() {
        return Ok(next.run(req).await);
    }

    // Verifier logs the rejection itself (with the library error kind).
    let claims = state.verifier.authenticate(req.headers())?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
