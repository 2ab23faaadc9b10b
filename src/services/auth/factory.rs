/// Factory: build `CredentialVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{CredentialVerifier, VerifierInitError};

pub fn build_verifier(config: &Config) -> Result<Arc<CredentialVerifier>, VerifierInitError> {
    let verifier = CredentialVerifier::new(&config.jwt).inspect_err(|e| {
        tracing::error!(error = %e, "failed to build credential verifier");
    })?;

    Ok(Arc::new(verifier))
}
