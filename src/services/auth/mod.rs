pub mod claims;
pub mod error;
pub mod factory;
pub mod policy;
pub mod verifier;

pub use claims::{IdentityClaims, UserRole};
pub use error::AuthError;
pub use factory::build_verifier;
pub use policy::{RoutePolicy, RoutePolicyTable};
pub use verifier::{CredentialVerifier, VerifierInitError};
