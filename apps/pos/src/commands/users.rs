//! # User Commands
//!
//! Staff accounts are managed by the owner of a tenant. Developer tools are
//! for owners whose email is on the configured developer list and act across
//! tenants through the backend's service functions.

use idcashier_client::{ManagedAccount, Session, SupabaseClient};
use idcashier_core::permissions::can_view_page;
use idcashier_core::{NewUser, Page, Permissions, Role, User, UserUpdate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult, Notification};
use crate::i18n::{Language, MessageKey};
use crate::state::SessionState;

/// Form data for a new staff account.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffForm {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to cashier.
    pub role: Option<Role>,
    /// Defaults to [`Permissions::cashier_defaults`] for cashiers.
    pub permissions: Option<Permissions>,
}

impl StaffForm {
    fn into_new_user(self, owner_id: &str) -> NewUser {
        let role = self.role.unwrap_or(Role::Cashier);
        let permissions = match (role, self.permissions) {
            (_, Some(p)) => Some(p),
            (Role::Cashier, None) => Some(Permissions::cashier_defaults()),
            (Role::Owner, None) => None,
        };
        NewUser {
            name: self.name,
            email: self.email,
            password: self.password,
            role,
            tenant_id: Some(owner_id.to_string()),
            permissions,
        }
    }
}

// =============================================================================
// Staff
// =============================================================================

pub async fn list_staff(client: &SupabaseClient, session: &SessionState) -> ApiResult<Vec<User>> {
    let current = session.require_owner()?;
    Ok(client.list_users(&current).await?)
}

pub async fn get_staff(client: &SupabaseClient, session: &SessionState, id: &str) -> ApiResult<User> {
    let current = session.require_owner()?;
    Ok(client.get_user(&current, id).await?)
}

pub async fn add_staff(client: &SupabaseClient, session: &SessionState, form: StaffForm) -> ApiResult<User> {
    let current = session.require_owner()?;
    let new_user = form.into_new_user(&current.user.id);
    Ok(client.create_user(&current, &new_user).await?)
}

pub async fn update_staff(
    client: &SupabaseClient,
    session: &SessionState,
    id: &str,
    update: &UserUpdate,
) -> ApiResult<User> {
    let current = session.require_owner()?;
    Ok(client.update_user(&current, id, update).await?)
}

pub async fn delete_staff(client: &SupabaseClient, session: &SessionState, id: &str) -> ApiResult<()> {
    let current = session.require_owner()?;
    if id == current.user.id {
        return Err(ApiError::validation("Tidak dapat menghapus akun sendiri"));
    }
    Ok(client.delete_user(&current, id).await?)
}

// =============================================================================
// Developer Tools
// =============================================================================

fn require_developer(session: &SessionState, developer_emails: &[String]) -> ApiResult<Session> {
    let current = session.require()?;
    if can_view_page(Some(&current.user), Page::Developer, developer_emails) {
        Ok(current)
    } else {
        Err(ApiError::permission_denied("developer"))
    }
}

pub async fn list_accounts(
    client: &SupabaseClient,
    session: &SessionState,
    developer_emails: &[String],
) -> ApiResult<Vec<ManagedAccount>> {
    let current = require_developer(session, developer_emails)?;
    Ok(client.list_accounts(&current).await?)
}

/// The created account id and the toast describing the outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreated {
    pub user_id: String,
    pub subscription_created: bool,
    pub notification: Notification,
}

/// Registers an owner with an initial subscription of `months`.
///
/// The account survives a failed subscription call; the caller gets a
/// warning telling the developer to extend it by hand.
#[allow(clippy::too_many_arguments)]
pub async fn create_account(
    client: &SupabaseClient,
    session: &SessionState,
    developer_emails: &[String],
    language: Language,
    name: &str,
    email: &str,
    password: &str,
    months: u32,
) -> ApiResult<AccountCreated> {
    let current = require_developer(session, developer_emails)?;
    let registration = client.register_owner(&current, name, email, password, months).await?;

    let notification = if registration.subscription_created {
        Notification::success(language, MessageKey::UserAdded)
    } else {
        warn!(user_id = %registration.user_id, "Initial subscription missing");
        Notification::warning(language, MessageKey::SubscriptionCreateFailed)
    };
    Ok(AccountCreated {
        user_id: registration.user_id,
        subscription_created: registration.subscription_created,
        notification,
    })
}

/// Adds one month to an account's subscription.
pub async fn extend_account(
    client: &SupabaseClient,
    session: &SessionState,
    developer_emails: &[String],
    user_id: &str,
) -> ApiResult<()> {
    let current = require_developer(session, developer_emails)?;
    client.extend_subscription(&current, user_id, 1).await?;
    info!(user_id, "Account extended by one month");
    Ok(())
}

pub async fn delete_account(
    client: &SupabaseClient,
    session: &SessionState,
    developer_emails: &[String],
    user_id: &str,
) -> ApiResult<()> {
    let current = require_developer(session, developer_emails)?;
    Ok(client.delete_account(&current, user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::error::{ErrorCode, NotificationVariant};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn developer() -> Vec<String> {
        vec!["sari@toko.id".to_string()]
    }

    fn signed_in(user: User) -> SessionState {
        let session = SessionState::new();
        session.set(session_for(user));
        session
    }

    #[test]
    fn test_staff_form_defaults() {
        let form = StaffForm {
            name: "Budi".into(),
            email: "budi@toko.id".into(),
            password: "rahasia".into(),
            ..Default::default()
        };
        let new_user = form.into_new_user("o1");
        assert_eq!(new_user.role, Role::Cashier);
        assert_eq!(new_user.tenant_id.as_deref(), Some("o1"));
        assert_eq!(new_user.permissions, Some(Permissions::cashier_defaults()));
    }

    #[tokio::test]
    async fn test_cashier_cannot_manage_staff() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let session = signed_in(cashier(None));

        let err = list_staff(&client, &session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_add_staff_registers_under_owner() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/auth-register"))
            .and(body_partial_json(json!({"role": "cashier", "tenant_id": "o1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": "c2", "name": "Rina", "email": "rina@toko.id", "role": "cashier", "tenant_id": "o1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = signed_in(owner());
        let form = StaffForm {
            name: "Rina".into(),
            email: "Rina@Toko.id".into(),
            password: "rahasia".into(),
            ..Default::default()
        };

        let user = add_staff(&client, &session, form).await.unwrap();
        assert_eq!(user.id, "c2");
        assert_eq!(user.owner_id(), "o1");
    }

    #[tokio::test]
    async fn test_developer_tools_need_listed_email() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let session = signed_in(owner());

        let err = list_accounts(&client, &session, &[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_create_account_warns_when_subscription_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/auth-register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "n1"}})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/subscriptions-update-user"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = signed_in(owner());
        let created = create_account(
            &client,
            &session,
            &developer(),
            Language::En,
            "Toko Baru",
            "baru@toko.id",
            "rahasia",
            3,
        )
        .await
        .unwrap();

        assert_eq!(created.user_id, "n1");
        assert!(!created.subscription_created);
        assert_eq!(created.notification.variant, NotificationVariant::Default);
        assert!(created.notification.body.starts_with("User created but subscription"));
    }

    #[tokio::test]
    async fn test_extend_account_adds_one_month() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/subscriptions-update-user"))
            .and(body_partial_json(json!({"userId": "n1", "months": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        extend_account(&client, &signed_in(owner()), &developer(), "n1").await.unwrap();
    }
}
