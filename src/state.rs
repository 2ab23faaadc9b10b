/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - verifier: CredentialVerifier, policies: RoutePolicyTable
 * - Both are immutable after startup; Clone only bumps the Arcs
 */
use std::sync::Arc;

use crate::services::auth::{CredentialVerifier, RoutePolicyTable};

#[derive(Clone, Debug)]
pub struct AppState {
    pub verifier: Arc<CredentialVerifier>,
    pub policies: Arc<RoutePolicyTable>,
}

impl AppState {
    pub fn new(verifier: Arc<CredentialVerifier>, policies: RoutePolicyTable) -> Self {
        Self {
            verifier,
            policies: Arc::new(policies),
        }
    }
}
