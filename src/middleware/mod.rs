/*
 * Responsibility
 * - Public interface of the middleware layer
 * - auth (the authentication gate), cors, http (request id / trace / limits), security headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
