use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::claims::{IdentityClaims, RawClaims};
use super::error::{AuthError, classify};
use crate::config::JwtSettings;

/// Errors building a verifier from configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VerifierInitError {
    #[error("signing secret is empty")]
    EmptySecret,
    #[error("unsupported algorithm {0:?} (expected HS256/HS384/HS512)")]
    UnsupportedAlgorithm(Algorithm),
}

/// Bearer credential verifier (HMAC shared secret).
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Clone)]
pub struct CredentialVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("CredentialVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl CredentialVerifier {
    pub fn new(settings: &JwtSettings) -> Result<Self, VerifierInitError> {
        if settings.secret.trim().is_empty() {
            return Err(VerifierInitError::EmptySecret);
        }
        if !matches!(
            settings.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(VerifierInitError::UnsupportedAlgorithm(settings.algorithm));
        }

        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());

        let mut validation = Validation::new(settings.algorithm);
        validation.leeway = settings.leeway_seconds;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        if let Some(iss) = &settings.issuer {
            validation.set_issuer(&[iss]);
        }
        // A token carrying `aud` is only checked against a configured audience.
        match &settings.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Extract, verify and structurally validate the request's bearer credential.
    ///
    /// Logs once per rejection; success is silent.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<IdentityClaims, AuthError> {
        let Some(token) = extract_bearer(headers) else {
            tracing::warn!(kind = AuthError::MissingCredential.kind(), "no bearer token provided");
            return Err(AuthError::MissingCredential);
        };

        self.verify(token)
    }

    /// Verify a raw token string (no header handling).
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let raw = match jsonwebtoken::decode::<RawClaims>(token, &self.decoding_key, &self.validation)
        {
            Ok(data) => data.claims,
            Err(err) => {
                let rejected = classify(&err);
                if rejected.is_expected() {
                    tracing::warn!(kind = rejected.kind(), error = ?err.kind(), "token verification failed");
                } else {
                    tracing::error!(kind = rejected.kind(), error = ?err.kind(), "token verification failed");
                }
                return Err(rejected);
            }
        };

        IdentityClaims::try_from(raw).map_err(|defect| {
            tracing::error!(
                kind = AuthError::InvalidClaims.kind(),
                defect = %defect,
                "invalid token payload structure"
            );
            AuthError::InvalidClaims
        })
    }
}

/// `Authorization: Bearer <token>`: split on the first space, scheme matched exactly.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if scheme != "Bearer" || token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{Value, json};

    use super::*;
    use crate::services::auth::claims::UserRole;

    const SECRET: &str = "test-secret";

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: SECRET.to_string(),
            algorithm: Algorithm::HS256,
            leeway_seconds: 0,
            issuer: None,
            audience: None,
        }
    }

    fn verifier() -> CredentialVerifier {
        CredentialVerifier::new(&settings()).unwrap()
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn sign_with(payload: &Value, secret: &str, alg: Algorithm) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn sign(payload: &Value) -> String {
        sign_with(payload, SECRET, Algorithm::HS256)
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn valid_payload() -> Value {
        json!({
            "sub": "u1",
            "email": "a@b.com",
            "role": "ADMIN",
            "iat": now(),
            "exp": now() + 3600,
        })
    }

    #[test]
    fn valid_token_is_allowed() {
        let token = sign(&valid_payload());
        let claims = verifier()
            .authenticate(&bearer(&format!("Bearer {token}")))
            .unwrap();

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn same_token_verifies_twice() {
        let v = verifier();
        let headers = bearer(&format!("Bearer {}", sign(&valid_payload())));

        let first = v.authenticate(&headers).unwrap();
        let second = v.authenticate(&headers).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_or_foreign_scheme_is_missing_credential() {
        let v = verifier();
        assert_eq!(v.authenticate(&HeaderMap::new()), Err(AuthError::MissingCredential));
        assert_eq!(v.authenticate(&bearer("Basic xyz")), Err(AuthError::MissingCredential));
        assert_eq!(v.authenticate(&bearer("bearer abc")), Err(AuthError::MissingCredential));
        assert_eq!(v.authenticate(&bearer("Bearer")), Err(AuthError::MissingCredential));
        assert_eq!(v.authenticate(&bearer("Bearer ")), Err(AuthError::MissingCredential));
    }

    #[test]
    fn extract_splits_on_first_space_only() {
        assert_eq!(extract_bearer(&bearer("Bearer a b")), Some("a b"));
        assert_eq!(extract_bearer(&bearer("Bearer abc")), Some("abc"));
    }

    #[test]
    fn expired_token_is_expired() {
        let mut payload = valid_payload();
        payload["exp"] = json!(now() - 10);

        assert_eq!(verifier().verify(&sign(&payload)), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn garbage_is_malformed() {
        let v = verifier();
        assert_eq!(v.verify("not-a-jwt"), Err(AuthError::MalformedToken));
        assert_eq!(v.verify("a.b.c"), Err(AuthError::MalformedToken));
    }

    #[test]
    fn other_key_never_allows() {
        let token = sign_with(&valid_payload(), "someone-else", Algorithm::HS256);
        let result = verifier().verify(&token);

        assert!(matches!(
            result,
            Err(AuthError::InvalidToken) | Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn other_algorithm_is_invalid() {
        let token = sign_with(&valid_payload(), SECRET, Algorithm::HS512);
        assert_eq!(verifier().verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = sign(&valid_payload());
        let forged = sign(&json!({
            "sub": "u1",
            "email": "a@b.com",
            "role": "USER",
            "exp": now() + 3600,
        }));

        // header + forged payload + original signature
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let spliced = parts.join(".");

        assert_eq!(verifier().verify(&spliced), Err(AuthError::InvalidToken));
    }

    #[test]
    fn incomplete_claims_are_invalid_structure() {
        let v = verifier();

        let only_sub = sign(&json!({ "sub": "u1", "exp": now() + 3600 }));
        assert_eq!(v.verify(&only_sub), Err(AuthError::InvalidClaims));

        let mut no_role = valid_payload();
        no_role.as_object_mut().unwrap().remove("role");
        assert_eq!(v.verify(&sign(&no_role)), Err(AuthError::InvalidClaims));

        let mut empty_email = valid_payload();
        empty_email["email"] = json!("");
        assert_eq!(v.verify(&sign(&empty_email)), Err(AuthError::InvalidClaims));

        let mut bad_role = valid_payload();
        bad_role["role"] = json!("SUPERUSER");
        assert_eq!(v.verify(&sign(&bad_role)), Err(AuthError::InvalidClaims));
    }

    #[test]
    fn payload_without_expiry_is_invalid_structure() {
        let token = sign(&json!({ "sub": "u1" }));
        assert_eq!(verifier().verify(&token), Err(AuthError::InvalidClaims));
    }

    #[test]
    fn not_yet_valid_is_invalid() {
        let mut payload = valid_payload();
        payload["nbf"] = json!(now() + 600);
        assert_eq!(verifier().verify(&sign(&payload)), Err(AuthError::InvalidToken));
    }

    #[test]
    fn issuer_is_checked_when_configured() {
        let v = CredentialVerifier::new(&JwtSettings {
            issuer: Some("sendit".to_string()),
            ..settings()
        })
        .unwrap();

        let mut payload = valid_payload();
        payload["iss"] = json!("someone-else");
        assert_eq!(v.verify(&sign(&payload)), Err(AuthError::InvalidToken));

        payload["iss"] = json!("sendit");
        assert!(v.verify(&sign(&payload)).is_ok());
    }

    #[test]
    fn construction_rejects_empty_secret_and_asymmetric_algorithms() {
        let err = CredentialVerifier::new(&JwtSettings {
            secret: String::new(),
            ..settings()
        })
        .unwrap_err();
        assert_eq!(err, VerifierInitError::EmptySecret);

        let err = CredentialVerifier::new(&JwtSettings {
            algorithm: Algorithm::RS256,
            ..settings()
        })
        .unwrap_err();
        assert_eq!(err, VerifierInitError::UnsupportedAlgorithm(Algorithm::RS256));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn logged_while<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs.lines())
    }

    #[test]
    fn success_is_not_logged() {
        let v = verifier();
        let headers = bearer(&format!("Bearer {}", sign(&valid_payload())));

        let (result, lines) = logged_while(|| v.authenticate(&headers));
        assert!(result.is_ok());
        assert!(lines.is_empty(), "unexpected log lines: {lines:?}");
    }

    #[test]
    fn each_rejection_logs_exactly_once() {
        let v = verifier();

        let mut expired = valid_payload();
        expired["exp"] = json!(now() - 10);
        let incomplete = json!({ "sub": "u1", "email": "a@b.com", "exp": now() + 3600 });
        let foreign = sign_with(&valid_payload(), "someone-else", Algorithm::HS256);

        let cases = [
            (HeaderMap::new(), AuthError::MissingCredential, "WARN"),
            (bearer(&format!("Bearer {}", sign(&expired))), AuthError::ExpiredToken, "WARN"),
            (bearer("Bearer not-a-jwt"), AuthError::MalformedToken, "ERROR"),
            (bearer(&format!("Bearer {foreign}")), AuthError::InvalidToken, "ERROR"),
            (bearer(&format!("Bearer {}", sign(&incomplete))), AuthError::InvalidClaims, "ERROR"),
        ];

        for (headers, expected, level) in cases {
            let (result, lines) = logged_while(|| v.authenticate(&headers));

            assert_eq!(result, Err(expected));
            assert_eq!(lines.len(), 1, "{expected:?} logged {lines:?}");
            assert!(lines[0].contains(level), "{expected:?} logged {lines:?}");
            assert!(lines[0].contains(expected.kind()), "{expected:?} logged {lines:?}");
        }
    }
}
