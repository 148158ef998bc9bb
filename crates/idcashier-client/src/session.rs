//! Authenticated session and token inspection.

use chrono::{DateTime, TimeZone, Utc};
use idcashier_core::User;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// What a successful login yields.
///
/// The profile is cached here so that tenant-scoped writes know the acting
/// user without another profile lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user: User) -> Self {
        let access_token = access_token.into();
        let expires_at = token_expiry(&access_token).map(|at| at.timestamp());
        Session {
            access_token,
            refresh_token: None,
            expires_at,
            user,
        }
    }

    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// Expired by the recorded expiry, or by the token's own `exp`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(exp) => exp <= now.timestamp(),
            None => is_token_expired(&self.access_token, now),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpClaim {
    exp: i64,
}

/// Reads the `exp` claim without verifying the signature.
///
/// The backend verifies tokens; the client only needs to know when to stop
/// presenting one.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpClaim>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    Utc.timestamp_opt(data.claims.exp, 0).single()
}

/// True when the token carries an `exp` at or before `now`.
///
/// Tokens that cannot be decoded are left to the backend to judge.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    token_expiry(token).is_some_and(|exp| exp <= now)
}


#[cfg(test)]
mod tests {
    use super::test_tokens::token_with_exp;
    use super::*;
    use idcashier_core::Role;

    #[test]
    fn test_token_expiry_decoded_without_key() {
        let token = token_with_exp(1_714_550_400);
        let exp = token_expiry(&token).unwrap();
        assert_eq!(exp.timestamp(), 1_714_550_400);
    }

    #[test]
    fn test_expired_token() {
        let now = Utc.timestamp_opt(1_714_550_400, 0).unwrap();
        assert!(is_token_expired(&token_with_exp(1_714_550_000), now));
        assert!(!is_token_expired(&token_with_exp(1_714_560_000), now));
    }

    #[test]
    fn test_garbage_token_is_not_judged_locally() {
        assert!(token_expiry("not-a-jwt").is_none());
        assert!(!is_token_expired("not-a-jwt", Utc::now()));
    }

    #[test]
    fn test_session_records_expiry() {
        let user = User::new("u1", "Sari", "sari@toko.id", Role::Owner);
        let session = Session::new(token_with_exp(2_000_000_000), user);
        assert_eq!(session.expires_at, Some(2_000_000_000));
        assert!(!session.is_expired(Utc.timestamp_opt(1_900_000_000, 0).unwrap()));
        assert!(session.is_expired(Utc.timestamp_opt(2_000_000_001, 0).unwrap()));
    }
}
