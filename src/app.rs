/*
 * Responsibility
 * - Load Config → build services (verifier, policy table) → assemble the Router
 * - Apply middleware (auth gate on /api routes, security headers, CORS, HTTP layers)
 * - Start with axum::serve()
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::{VerifierInitError, build_verifier};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins if set, e.g. RUST_LOG=info,sendit_gate=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "failed to start application"))?;
    init_panic_hook(!config.app_env.is_production());

    let state = build_state(&config)
        .inspect_err(|e| tracing::error!(error = %e, "failed to start application"))?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    tracing::info!(
        "application running in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Process-level services, built once and shared read-only by every request.
pub fn build_state(config: &Config) -> Result<AppState, VerifierInitError> {
    let verifier = build_verifier(config)?;
    let policies = api::policies();
    tracing::debug!(routes = policies.len(), "route policy table built");

    Ok(AppState::new(verifier, policies))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let routes = Router::new().nest(api::API_PREFIX, api::routes());
    let routes = middleware::auth::access::apply(routes, state.clone());

    let router = routes.with_state(state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}
