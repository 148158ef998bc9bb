//! # Auth Commands
//!
//! Session lifecycle. The state container is updated and the token
//! persisted only after the backend has accepted the credentials.
//!
//! ## Startup Restore
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stored token? ──no──► signed out                                       │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  JWT exp passed? ──yes──► forget token ──► signed out (no remote call)  │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  GET /auth/v1/user + profile ──✗──► forget token ──► signed out         │
//! │       │ ✓                                                               │
//! │       ▼                                                                 │
//! │  SessionState::set(session)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use idcashier_client::session::is_token_expired;
use idcashier_client::{Session, SupabaseClient};
use idcashier_core::permissions::visible_pages;
use idcashier_core::validation::validate_password;
use idcashier_core::{resolve_permissions, CapabilitySet, Page, Role, User};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::state::{CartState, CatalogState, Preferences, SessionState};

/// What the shell needs after sign-in: who, what they may do, where they
/// may go.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: User,
    pub capabilities: CapabilitySet,
    pub pages: Vec<Page>,
}

impl Profile {
    pub fn for_user(user: &User, developer_emails: &[String]) -> Self {
        Profile {
            user: user.clone(),
            capabilities: resolve_permissions(Some(user)),
            pages: visible_pages(Some(user), developer_emails),
        }
    }
}

/// Signs in, stores the session and resets navigation to the dashboard.
pub async fn login(
    client: &SupabaseClient,
    session: &SessionState,
    prefs: &Preferences,
    email: &str,
    password: &str,
) -> ApiResult<Profile> {
    debug!("login command");
    let new_session = client.login(email, password).await?;

    prefs.set_token(new_session.token())?;
    prefs.reset_navigation()?;

    let profile = Profile::for_user(&new_session.user, client.config().developer_emails());
    session.set(new_session);
    Ok(profile)
}

/// Signs out everywhere this process knows about.
///
/// The remote sign-out is best effort; local state is cleared regardless.
pub async fn logout(
    client: &SupabaseClient,
    session: &SessionState,
    cart: &CartState,
    catalog: &CatalogState,
    prefs: &Preferences,
) -> ApiResult<()> {
    debug!("logout command");
    if let Some(current) = session.current() {
        if let Err(err) = client.sign_out(current.token()).await {
            warn!(error = %err, "Remote sign-out failed, clearing local session anyway");
        }
    }

    session.clear();
    cart.with_cart_mut(|c| c.clear());
    catalog.clear();
    prefs.clear_token()?;
    prefs.reset_navigation()?;
    info!("Logged out");
    Ok(())
}

/// Restores the session from the stored token. `Ok(None)` means signed out.
pub async fn restore_session(
    client: &SupabaseClient,
    session: &SessionState,
    prefs: &Preferences,
    now: DateTime<Utc>,
) -> ApiResult<Option<Profile>> {
    let Some(token) = prefs.token()? else {
        debug!("No stored token");
        return Ok(None);
    };

    if is_token_expired(&token, now) {
        info!("Stored token expired, discarding");
        prefs.clear_token()?;
        session.clear();
        return Ok(None);
    }

    match client.current_user(&token).await {
        Ok(user) => {
            let profile = Profile::for_user(&user, client.config().developer_emails());
            session.set(Session::new(token, user));
            Ok(Some(profile))
        }
        Err(err) => {
            warn!(error = %err, "Stored token rejected, discarding");
            prefs.clear_token()?;
            session.clear();
            Ok(None)
        }
    }
}

/// Profile of the signed-in user.
pub fn whoami(client: &SupabaseClient, session: &SessionState) -> ApiResult<Profile> {
    let current = session.require()?;
    Ok(Profile::for_user(&current.user, client.config().developer_emails()))
}

/// Public sign-up. Signs the new user in when the backend returns a session.
pub async fn register(
    client: &SupabaseClient,
    session: &SessionState,
    prefs: &Preferences,
    name: &str,
    email: &str,
    password: &str,
    role: Option<Role>,
) -> ApiResult<Profile> {
    debug!("register command");
    let registration = client
        .register(name, email, password, role.unwrap_or_default())
        .await?;

    let profile = Profile::for_user(&registration.user, client.config().developer_emails());
    if let Some(new_session) = registration.session {
        prefs.set_token(new_session.token())?;
        prefs.reset_navigation()?;
        session.set(new_session);
    }
    Ok(profile)
}

pub async fn request_password_reset(client: &SupabaseClient, email: &str) -> ApiResult<()> {
    debug!("request_password_reset command");
    client.request_password_reset(email).await?;
    Ok(())
}

/// Completes a reset with the recovery token from the emailed link.
pub async fn reset_password(client: &SupabaseClient, recovery_token: &str, password: &str) -> ApiResult<()> {
    validate_password(password)?;
    client.reset_password(recovery_token, password).await?;
    info!("Password reset completed");
    Ok(())
}

/// Changes the signed-in user's password.
pub async fn change_password(client: &SupabaseClient, session: &SessionState, password: &str) -> ApiResult<()> {
    let current = session.require()?;
    validate_password(password)?;
    client.update_password(current.token(), password).await?;
    info!(user_id = %current.user.id, "Password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile_json() -> serde_json::Value {
        json!({
            "id": "o1", "name": "Sari", "email": "sari@toko.id", "role": "owner",
            "tenant_id": null, "permissions": null, "created_at": "2024-01-01T00:00:00Z"
        })
    }

    async fn mount_profile(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_persists_token_and_resets_navigation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .mount(&server)
            .await;
        mount_profile(&server).await;

        let client = client_for(&server);
        let session = SessionState::new();
        let prefs = Preferences::in_memory();
        prefs.set_current_page(Page::Reports).unwrap();

        let profile = login(&client, &session, &prefs, "sari@toko.id", "rahasia").await.unwrap();
        assert_eq!(profile.user.id, "o1");
        assert_eq!(profile.capabilities, CapabilitySet::all());
        assert!(!profile.pages.contains(&Page::Developer));

        assert_eq!(prefs.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(prefs.current_page().unwrap(), Page::Dashboard);
        assert_eq!(session.user().unwrap().name, "Sari");
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = SessionState::new();
        let prefs = Preferences::in_memory();

        let err = login(&client, &session, &prefs, "sari@toko.id", "salah").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        assert!(!session.is_signed_in());
        assert_eq!(prefs.token().unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_discards_expired_token_without_remote_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = SessionState::new();
        let prefs = Preferences::in_memory();
        let now = Utc::now();
        prefs.set_token(&token_with_exp(now.timestamp() - 60)).unwrap();

        let restored = restore_session(&client, &session, &prefs, now).await.unwrap();
        assert!(restored.is_none());
        assert_eq!(prefs.token().unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_valid_token() {
        let server = MockServer::start().await;
        let now = Utc::now();
        let token = token_with_exp(now.timestamp() + 3600);
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "auth-1", "email": "Sari@Toko.id"})))
            .expect(1)
            .mount(&server)
            .await;
        mount_profile(&server).await;

        let client = client_for(&server);
        let session = SessionState::new();
        let prefs = Preferences::in_memory();
        prefs.set_token(&token).unwrap();

        let restored = restore_session(&client, &session, &prefs, now).await.unwrap();
        assert_eq!(restored.unwrap().user.email, "sari@toko.id");
        assert_eq!(session.current().unwrap().access_token, token);
    }

    #[tokio::test]
    async fn test_restore_rejected_token_is_forgotten() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = SessionState::new();
        let prefs = Preferences::in_memory();
        let now = Utc::now();
        prefs.set_token(&token_with_exp(now.timestamp() + 3600)).unwrap();

        assert!(restore_session(&client, &session, &prefs, now).await.unwrap().is_none());
        assert_eq!(prefs.token().unwrap(), None);
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn test_logout_clears_everything_even_if_remote_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = SessionState::new();
        session.set(session_for(owner()));
        let cart = CartState::new();
        cart.with_cart_mut(|c| c.add_product(&product("p1", 1_000, 5))).unwrap();
        let catalog = CatalogState::new();
        catalog.set_products(vec![product("p1", 1_000, 5)]);
        let prefs = Preferences::in_memory();
        prefs.set_token(TOKEN).unwrap();
        prefs.set_current_page(Page::Sales).unwrap();

        logout(&client, &session, &cart, &catalog, &prefs).await.unwrap();
        assert!(!session.is_signed_in());
        assert!(cart.snapshot().is_empty());
        assert!(catalog.products().is_empty());
        assert_eq!(prefs.token().unwrap(), None);
        assert_eq!(prefs.current_page().unwrap(), Page::Dashboard);
    }

    #[tokio::test]
    async fn test_change_password_requires_session_and_length() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let session = SessionState::new();

        let err = change_password(&client, &session, "panjang123").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);

        session.set(session_for(owner()));
        let err = change_password(&client, &session, "abc").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_whoami_lists_developer_page_for_listed_owner() {
        let mut config = idcashier_client::BackendConfig::new("http://localhost:54321", ANON_KEY);
        config.app.developer_emails = vec!["SARI@toko.id".into()];
        let client = SupabaseClient::new(config).unwrap();
        let session = SessionState::new();
        session.set(session_for(owner()));

        let profile = whoami(&client, &session).unwrap();
        assert!(profile.pages.contains(&Page::Developer));
    }
}
