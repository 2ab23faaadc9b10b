/*
 * Responsibility
 * - Public surface of the HTTP API (routes + policies, extractors)
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{API_PREFIX, policies, routes};
