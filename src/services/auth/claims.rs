//! Identity claims carried by a verified access token.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Closed set of roles a principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    User,
    Driver,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
            Self::Driver => "DRIVER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole;

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            "DRIVER" => Ok(Self::Driver),
            _ => Err(UnknownRole),
        }
    }
}

/// Raw payload as decoded from the token.
///
/// Every application claim is optional here so that an incomplete but validly
/// signed token reaches structural validation instead of failing JSON decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Which required claim failed structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDefect {
    Missing(&'static str),
    UnknownRole,
}

impl fmt::Display for ClaimDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing or empty '{}' claim", name),
            Self::UnknownRole => write!(f, "unknown 'role' claim"),
        }
    }
}

/// The authenticated principal attached to a request after verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    pub exp: i64,
}

impl IdentityClaims {
    /// Downstream authorization: allow only the listed roles.
    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!(sub = %self.sub, role = %self.role, "role not permitted");
            Err(AppError::Forbidden)
        }
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ClaimDefect> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ClaimDefect::Missing(name)),
    }
}

impl TryFrom<RawClaims> for IdentityClaims {
    type Error = ClaimDefect;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let sub = required(raw.sub, "sub")?;
        let email = required(raw.email, "email")?;
        let role = required(raw.role, "role")?
            .parse::<UserRole>()
            .map_err(|_| ClaimDefect::UnknownRole)?;
        let exp = raw.exp.ok_or(ClaimDefect::Missing("exp"))?;

        Ok(Self {
            sub,
            email,
            role,
            iat: raw.iat,
            exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> RawClaims {
        RawClaims {
            sub: Some("u1".into()),
            email: Some("a@b.com".into()),
            role: Some("ADMIN".into()),
            iat: Some(1),
            exp: Some(2),
        }
    }

    #[test]
    fn complete_claims_convert() {
        let claims = IdentityClaims::try_from(complete()).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp, 2);
    }

    #[test]
    fn each_required_claim_is_enforced() {
        let raw = RawClaims { sub: None, ..complete() };
        assert_eq!(IdentityClaims::try_from(raw), Err(ClaimDefect::Missing("sub")));

        let raw = RawClaims { email: Some("  ".into()), ..complete() };
        assert_eq!(IdentityClaims::try_from(raw), Err(ClaimDefect::Missing("email")));

        let raw = RawClaims { role: None, ..complete() };
        assert_eq!(IdentityClaims::try_from(raw), Err(ClaimDefect::Missing("role")));
    }

    #[test]
    fn role_outside_closed_set_is_a_defect() {
        let raw = RawClaims { role: Some("admin".into()), ..complete() };
        assert_eq!(IdentityClaims::try_from(raw), Err(ClaimDefect::UnknownRole));
    }

    #[test]
    fn role_wire_form_is_screaming_case() {
        assert_eq!(serde_json::to_string(&UserRole::Driver).unwrap(), "\"DRIVER\"");
        assert_eq!("USER".parse::<UserRole>(), Ok(UserRole::User));
    }

    #[test]
    fn require_role_maps_to_forbidden() {
        let claims = IdentityClaims::try_from(RawClaims {
            role: Some("DRIVER".into()),
            ..complete()
        })
        .unwrap();

        assert!(claims.require_role(&[UserRole::Driver, UserRole::Admin]).is_ok());
        assert!(matches!(
            claims.require_role(&[UserRole::Admin]),
            Err(AppError::Forbidden)
        ));
    }
}
