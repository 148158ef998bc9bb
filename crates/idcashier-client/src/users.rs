//! # Users and Developer Accounts
//!
//! Staff accounts belong to an owner through `tenant_id`. Reads and deletes
//! go straight to the `users` table; creates and updates go through edge
//! functions because they must also touch the identity provider's record.
//!
//! ```text
//! list / get      GET    /rest/v1/users?tenant_id=eq.{owner}
//! create          POST   /functions/v1/auth-register
//! update          POST   /functions/v1/users-update?id={id}
//! delete          DELETE /rest/v1/users?id=eq.{id}&tenant_id=eq.{owner}
//!
//! developer:
//! list accounts   GET    /functions/v1/subscriptions-get-all-users
//! register owner  POST   /functions/v1/auth-register       {role: owner}
//! extend          POST   /functions/v1/subscriptions-update-user {userId, months}
//! delete account  DELETE /functions/v1/users-delete        {id}
//! ```

use chrono::NaiveDate;
use idcashier_core::types::parse_date;
use idcashier_core::validation::{normalize_email, validate_name, validate_password};
use idcashier_core::{NewUser, Role, User, UserUpdate};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::{Query, SupabaseClient};
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

// =============================================================================
// Developer View
// =============================================================================

/// Subscription state reported by `subscriptions-get-all-users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountSubscription {
    Active,
    Expired,
    None,
}

impl AccountSubscription {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("active") => AccountSubscription::Active,
            Some("expired") => AccountSubscription::Expired,
            _ => AccountSubscription::None,
        }
    }
}

/// One row of the developer account list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedAccount {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub subscription_status: Option<String>,
}

impl ManagedAccount {
    pub fn subscription(&self) -> AccountSubscription {
        AccountSubscription::parse(self.subscription_status.as_deref())
    }

    /// Subscription start, or the registration date when there is none.
    pub fn registered_on(&self) -> Option<NaiveDate> {
        self.start_date
            .as_deref()
            .or(self.created_at.as_deref())
            .and_then(parse_date)
    }

    pub fn expires_on(&self) -> Option<NaiveDate> {
        self.end_date.as_deref().and_then(parse_date)
    }
}

/// Result of creating an owner account from the developer page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerRegistration {
    pub user_id: String,
    /// False when the account exists but the initial subscription call failed.
    pub subscription_created: bool,
}

/// `auth-register` answers with `{user: {...}}` or the user object itself.
fn user_from_response(value: Value) -> ClientResult<User> {
    let inner = match value {
        Value::Object(mut map) if map.contains_key("user") => map.remove("user").unwrap_or(Value::Null),
        other => other,
    };
    if inner.is_null() {
        return Err(ClientError::ServerNotResponding("missing user in response".into()));
    }
    Ok(serde_json::from_value(inner)?)
}

fn registered_id(value: &Value) -> Option<String> {
    value
        .pointer("/user/id")
        .or_else(|| value.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl SupabaseClient {
    // =========================================================================
    // Staff Users
    // =========================================================================

    pub async fn list_users(&self, session: &Session) -> ClientResult<Vec<User>> {
        let query = Query::new().select("*").eq("tenant_id", session.user.owner_id());
        self.select(session.token(), "users", &query).await
    }

    pub async fn get_user(&self, session: &Session, id: &str) -> ClientResult<User> {
        let query = Query::new()
            .select("*")
            .eq("id", id)
            .eq("tenant_id", session.user.owner_id());
        self.select_single(session.token(), "users", &query, id).await
    }

    /// Creates a staff account under the acting owner.
    pub async fn create_user(&self, session: &Session, new_user: &NewUser) -> ClientResult<User> {
        validate_name("name", &new_user.name)?;
        validate_password(&new_user.password)?;
        let email = normalize_email(&new_user.email)?;

        let body = NewUser {
            email,
            tenant_id: new_user
                .tenant_id
                .clone()
                .or_else(|| Some(session.user.owner_id().to_string())),
            ..new_user.clone()
        };
        let value: Value = self
            .invoke(session.token(), "auth-register", Method::POST, Some(&body))
            .await?;
        let user = user_from_response(value)?;
        info!(user_id = %user.id, role = %user.role, "Staff user created");
        Ok(user)
    }

    pub async fn update_user(&self, session: &Session, id: &str, update: &UserUpdate) -> ClientResult<User> {
        if let Some(name) = &update.name {
            validate_name("name", name)?;
        }
        if let Some(password) = &update.password {
            validate_password(password)?;
        }
        let body = UserUpdate {
            email: update.email.as_deref().map(normalize_email).transpose()?,
            ..update.clone()
        };
        let name = format!("users-update?id={id}");
        let value: Value = self.invoke(session.token(), &name, Method::POST, Some(&body)).await?;
        user_from_response(value)
    }

    pub async fn delete_user(&self, session: &Session, id: &str) -> ClientResult<()> {
        let query = Query::new().eq("id", id).eq("tenant_id", session.user.owner_id());
        let removed: Vec<Value> = self.delete(session.token(), "users", &query).await?;
        if removed.is_empty() {
            return Err(ClientError::not_found("users", id));
        }
        info!(user_id = id, "Staff user deleted");
        Ok(())
    }

    // =========================================================================
    // Developer Tools
    // =========================================================================

    pub async fn list_accounts(&self, session: &Session) -> ClientResult<Vec<ManagedAccount>> {
        self.invoke::<(), _>(session.token(), "subscriptions-get-all-users", Method::GET, None)
            .await
    }

    /// Registers an owner account and gives it an initial subscription.
    ///
    /// A failed subscription call does not undo the account; it is reported
    /// through `subscription_created`.
    pub async fn register_owner(
        &self,
        session: &Session,
        name: &str,
        email: &str,
        password: &str,
        months: u32,
    ) -> ClientResult<OwnerRegistration> {
        validate_name("name", name)?;
        validate_password(password)?;
        let email = normalize_email(email)?;

        let body = json!({
            "name": name.trim(),
            "email": email,
            "password": password,
            "role": Role::Owner,
        });
        let value: Value = self
            .invoke(session.token(), "auth-register", Method::POST, Some(&body))
            .await?;
        let user_id = registered_id(&value)
            .ok_or_else(|| ClientError::ServerNotResponding("missing user id in registration response".into()))?;

        let subscription_created = match self.extend_subscription(session, &user_id, months).await {
            Ok(()) => true,
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "Account created but subscription failed");
                false
            }
        };
        info!(user_id = %user_id, months, "Owner account registered");
        Ok(OwnerRegistration {
            user_id,
            subscription_created,
        })
    }

    /// Adds `months` to a user's subscription. The backend computes the new period.
    pub async fn extend_subscription(&self, session: &Session, user_id: &str, months: u32) -> ClientResult<()> {
        let body = json!({ "userId": user_id, "months": months });
        let _: Value = self
            .invoke(session.token(), "subscriptions-update-user", Method::POST, Some(&body))
            .await?;
        info!(user_id, months, "Subscription extended");
        Ok(())
    }

    pub async fn delete_account(&self, session: &Session, user_id: &str) -> ClientResult<()> {
        let body = json!({ "id": user_id });
        let _: Value = self
            .invoke(session.token(), "users-delete", Method::DELETE, Some(&body))
            .await?;
        info!(user_id, "Account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn owner_session() -> Session {
        Session::new(TOKEN, User::new("owner-1", "Sari", "sari@toko.id", Role::Owner))
    }

    #[test]
    fn test_account_subscription_parse() {
        assert_eq!(AccountSubscription::parse(Some("active")), AccountSubscription::Active);
        assert_eq!(AccountSubscription::parse(Some("expired")), AccountSubscription::Expired);
        assert_eq!(AccountSubscription::parse(Some("trial")), AccountSubscription::None);
        assert_eq!(AccountSubscription::parse(None), AccountSubscription::None);
    }

    #[test]
    fn test_registered_on_falls_back_to_created_at() {
        let account: ManagedAccount = serde_json::from_value(json!({
            "id": "u9", "created_at": "2024-03-01T08:00:00Z", "end_date": "2025-03-01"
        }))
        .unwrap();
        assert_eq!(account.registered_on(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(account.expires_on(), NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[tokio::test]
    async fn test_list_users_scoped_to_owner() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("tenant_id", "eq.owner-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "c1", "name": "Budi", "email": "budi@toko.id", "role": "cashier", "tenant_id": "owner-1"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let users = client.list_users(&owner_session()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Cashier);
    }

    #[tokio::test]
    async fn test_create_user_defaults_tenant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/auth-register"))
            .and(body_json(json!({
                "name": "Budi",
                "email": "budi@toko.id",
                "password": "rahasia",
                "role": "cashier",
                "tenant_id": "owner-1",
                "permissions": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": "c1", "name": "Budi", "email": "budi@toko.id", "role": "cashier", "tenant_id": "owner-1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let new_user = NewUser {
            name: "Budi".into(),
            email: " Budi@Toko.id ".into(),
            password: "rahasia".into(),
            role: Role::Cashier,
            tenant_id: None,
            permissions: None,
        };
        let user = client.create_user(&owner_session(), &new_user).await.unwrap();
        assert_eq!(user.id, "c1");
        assert_eq!(user.tenant_id.as_deref(), Some("owner-1"));
    }

    #[tokio::test]
    async fn test_create_user_function_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/auth-register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "User already exists"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let new_user = NewUser {
            name: "Budi".into(),
            email: "budi@toko.id".into(),
            password: "rahasia".into(),
            role: Role::Cashier,
            tenant_id: None,
            permissions: None,
        };
        let err = client.create_user(&owner_session(), &new_user).await.unwrap_err();
        assert_eq!(err.to_string(), "User already exists");
    }

    #[tokio::test]
    async fn test_update_user_passes_id_in_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/users-update"))
            .and(query_param("id", "c1"))
            .and(body_json(json!({"name": "Budi S"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1", "name": "Budi S"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let update = UserUpdate {
            name: Some("Budi S".into()),
            ..UserUpdate::default()
        };
        let user = client.update_user(&owner_session(), "c1", &update).await.unwrap();
        assert_eq!(user.name, "Budi S");
    }

    #[tokio::test]
    async fn test_register_owner_subscription_failure_is_soft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/auth-register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "new-owner"}})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/subscriptions-update-user"))
            .and(body_json(json!({"userId": "new-owner", "months": 12})))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reg = client
            .register_owner(&owner_session(), "Toko Baru", "baru@toko.id", "rahasia", 12)
            .await
            .unwrap();
        assert_eq!(reg.user_id, "new-owner");
        assert!(!reg.subscription_created);
    }

    #[tokio::test]
    async fn test_delete_account_uses_delete_method() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/functions/v1/users-delete"))
            .and(body_json(json!({"id": "u9"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.delete_account(&owner_session(), "u9").await.unwrap();
    }
}
