//! # Authentication
//!
//! Password sign-in, sign-up, password reset and profile lookup.
//!
//! ## Login Flow
//! ```text
//! ┌──────────────┐  POST /auth/v1/token?grant_type=password   ┌─────────────┐
//! │  login()     │───────────────────────────────────────────►│   GoTrue    │
//! │              │◄─────────── access_token, refresh_token ───│             │
//! │              │                                            └─────────────┘
//! │              │  GET /rest/v1/users?email=eq.{email}       ┌─────────────┐
//! │              │───────────────────────────────────────────►│  PostgREST  │
//! │              │◄──────── profile (single-row fallback) ────│             │
//! └──────┬───────┘                                            └─────────────┘
//!        ▼
//!    Session { token, user }
//! ```
//!
//! Emails are trimmed and lower-cased before every auth call. The profile is
//! looked up by email because auth user ids and profile ids may differ.

use idcashier_core::validation::{normalize_email, validate_password};
use idcashier_core::{Role, User};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::{Query, SupabaseClient};
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Columns of the `users` profile table.
pub const PROFILE_COLUMNS: &str = "id, name, email, role, tenant_id, permissions, created_at";

/// The identity-provider user behind a token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
}

/// Outcome of a sign-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub user: User,
    /// `None` when the project requires email confirmation first.
    pub session: Option<Session>,
}

impl SupabaseClient {
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<(String, Option<String>, Option<i64>)> {
        let request = self
            .anon(Method::POST, self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let (status, body) = self.send_raw(request).await?;
        match status {
            s if s.is_success() => {
                let token: TokenResponse = serde_json::from_str(&body)?;
                Ok((token.access_token, token.refresh_token, token.expires_at))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(ClientError::InvalidCredentials),
            _ => Err(ClientError::from_response(status, &body)),
        }
    }

    /// Signs in and loads the profile.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let email = normalize_email(email)?;
        info!(email = %email, "Logging in");

        let (access_token, refresh_token, expires_at) = self.sign_in_with_password(&email, password).await?;
        let user = self.fetch_profile(&access_token, &email).await?;

        let mut session = Session::new(access_token, user);
        session.refresh_token = refresh_token;
        if expires_at.is_some() {
            session.expires_at = expires_at;
        }
        Ok(session)
    }

    /// Profile row by email, with the single-row fallback.
    pub async fn fetch_profile(&self, token: &str, email: &str) -> ClientResult<User> {
        let query = Query::new().select(PROFILE_COLUMNS).eq("email", email);
        self.select_single(token, "users", &query, email).await
    }

    /// The identity-provider user for a token.
    pub async fn get_auth_user(&self, token: &str) -> ClientResult<AuthUser> {
        let request = self.authed(Method::GET, self.auth_url("user"), token);
        self.send_json(request).await
    }

    /// Validates a token remotely and loads its profile.
    pub async fn current_user(&self, token: &str) -> ClientResult<User> {
        let auth_user = self.get_auth_user(token).await?;
        let email = auth_user.email.ok_or(ClientError::NotAuthenticated)?;
        self.fetch_profile(token, &email.to_lowercase()).await
    }

    /// Signs up and inserts the profile row.
    ///
    /// Owners are their own tenant; anyone else gets a tenant assigned later.
    pub async fn register(&self, name: &str, email: &str, password: &str, role: Role) -> ClientResult<Registration> {
        let email = normalize_email(email)?;
        validate_password(password)?;
        info!(email = %email, role = %role, "Registering");

        let request = self.anon(Method::POST, self.auth_url("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": { "name": name, "role": role.as_str() },
        }));
        let (status, body) = self.send_raw(request).await?;
        if !status.is_success() {
            return Err(match status {
                StatusCode::BAD_REQUEST => ClientError::InvalidInput("Invalid input data".into()),
                StatusCode::CONFLICT => ClientError::Rejected {
                    status: status.as_u16(),
                    message: "User already exists".into(),
                },
                _ => ClientError::from_response(status, &body),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        let (auth_user, token) = if value.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(value)?;
            (token.user.clone(), Some(token))
        } else {
            (serde_json::from_value::<AuthUser>(value).ok(), None)
        };

        let auth_user = auth_user.ok_or_else(|| ClientError::Rejected {
            status: status.as_u16(),
            message: "User already exists but is not confirmed. Please check your email.".into(),
        })?;

        let bearer = token
            .as_ref()
            .map(|t| t.access_token.clone())
            .unwrap_or_else(|| self.config().anon_key().to_string());
        let tenant_id = role.is_owner().then(|| auth_user.id.clone());

        let row = json!([{
            "id": auth_user.id,
            "name": name,
            "email": email,
            "role": role.as_str(),
            "tenant_id": tenant_id,
        }]);
        let mut rows: Vec<User> = self.insert(&bearer, "users", &row).await?;
        if rows.is_empty() {
            return Err(ClientError::ServerNotResponding("profile insert returned no row".into()));
        }
        let user = rows.remove(0);

        let session = token.map(|t| {
            let mut session = Session::new(t.access_token, user.clone());
            session.refresh_token = t.refresh_token;
            if t.expires_at.is_some() {
                session.expires_at = t.expires_at;
            }
            session
        });

        Ok(Registration { user, session })
    }

    /// Sends the reset link. The redirect target is `{site_url}/reset-password`.
    pub async fn request_password_reset(&self, email: &str) -> ClientResult<()> {
        let email = normalize_email(email)?;
        let redirect = self.config().reset_redirect_url();
        debug!(email = %email, redirect = %redirect, "Requesting password reset");

        let request = self
            .anon(Method::POST, self.auth_url("recover"))
            .query(&[("redirect_to", redirect.as_str())])
            .json(&json!({ "email": email }));
        let (status, body) = self.send_raw(request).await?;
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => Err(ClientError::InvalidInput("Invalid email format".into())),
            _ => Err(ClientError::from_response(status, &body)),
        }
    }

    /// Changes the password of the token's user.
    pub async fn update_password(&self, token: &str, password: &str) -> ClientResult<()> {
        validate_password(password)?;
        let request = self
            .authed(Method::PUT, self.auth_url("user"), token)
            .json(&json!({ "password": password }));
        self.send_empty(request).await
    }

    /// Completes a reset using the recovery token from the emailed link.
    pub async fn reset_password(&self, recovery_token: &str, password: &str) -> ClientResult<()> {
        self.update_password(recovery_token, password).await
    }

    /// Revokes the token server-side. An already invalid token counts as success.
    pub async fn sign_out(&self, token: &str) -> ClientResult<()> {
        let request = self.authed(Method::POST, self.auth_url("logout"), token);
        match self.send_empty(request).await {
            Err(ClientError::SessionExpired) => {
                warn!("Token already invalid at sign-out");
                Ok(())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::test_support::*;
    use crate::error::ClientError;
    use idcashier_core::Role;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile() -> serde_json::Value {
        json!({
            "id": "u1", "name": "Sari", "email": "sari@toko.id", "role": "owner",
            "tenant_id": null, "permissions": null, "created_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_login_normalizes_email_and_loads_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_partial_json(json!({"email": "sari@toko.id"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok", "refresh_token": "ref", "expires_at": 2000000000
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("email", "eq.sari@toko.id"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = client.login("  Sari@Toko.ID ", "rahasia").await.unwrap();
        assert_eq!(session.access_token, "tok");
        assert_eq!(session.refresh_token.as_deref(), Some("ref"));
        assert_eq!(session.expires_at, Some(2_000_000_000));
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.role, Role::Owner);
    }

    #[tokio::test]
    async fn test_login_with_profile_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(header("accept", "application/vnd.pgrst.object+json"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({"code": "PGRST116"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile()])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = client.login("sari@toko.id", "rahasia").await.unwrap();
        assert_eq!(session.user.name, "Sari");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant", "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.login("sari@toko.id", "salah").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_email_locally() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let err = client.login("bukan-email", "rahasia").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_owner_inserts_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_partial_json(json!({"data": {"name": "Budi", "role": "owner"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok", "user": {"id": "auth-1", "email": "budi@toko.id"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/users"))
            .and(body_partial_json(json!([{"id": "auth-1", "tenant_id": "auth-1"}])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": "auth-1", "name": "Budi", "email": "budi@toko.id", "role": "owner", "tenant_id": "auth-1"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reg = client.register("Budi", "budi@toko.id", "rahasia", Role::Owner).await.unwrap();
        assert_eq!(reg.user.id, "auth-1");
        assert_eq!(reg.session.unwrap().access_token, "tok");
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let err = client.register("Budi", "budi@toko.id", "123", Role::Owner).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_password_reset_uses_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .and(query_param("redirect_to", "https://idcashier.my.id/reset-password"))
            .and(body_partial_json(json!({"email": "sari@toko.id"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.request_password_reset("SARI@toko.id").await.unwrap();
    }

    #[tokio::test]
    async fn test_current_user_expired_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "invalid JWT"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.current_user(TOKEN).await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
    }

    #[tokio::test]
    async fn test_sign_out_tolerates_invalid_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.sign_out(TOKEN).await.unwrap();
    }
}
