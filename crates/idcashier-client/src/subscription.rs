//! Subscription lookup for the signed-in account.

use chrono::NaiveDate;
use idcashier_core::{Subscription, SubscriptionStatus};
use tracing::warn;

use crate::client::{Query, SupabaseClient};
use crate::error::ClientResult;
use crate::session::Session;

impl SupabaseClient {
    /// The subscription row of the signed-in user, if any.
    ///
    /// Subscriptions belong to the account that pays, so a cashier sees the
    /// owner's row.
    pub async fn current_subscription(&self, session: &Session) -> ClientResult<Option<Subscription>> {
        let query = Query::new().select("*").eq("user_id", session.user.owner_id());
        self.select_optional(session.token(), "subscriptions", &query).await
    }

    /// Resolves the status shown on the subscription page.
    ///
    /// Authentication failures propagate. Any other lookup failure is
    /// reported as `None`, which does not block the user.
    pub async fn subscription_status(&self, session: &Session, today: NaiveDate) -> ClientResult<SubscriptionStatus> {
        match self.current_subscription(session).await {
            Ok(sub) => Ok(SubscriptionStatus::from_subscription(sub.as_ref(), today)),
            Err(err) if err.is_auth_error() => Err(err),
            Err(err) => {
                warn!(error = %err, "Subscription lookup failed, treating as none");
                Ok(SubscriptionStatus::None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::*;
    use crate::error::ClientError;
    use idcashier_core::{Role, User};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> Session {
        Session::new(TOKEN, User::new("u1", "Sari", "sari@toko.id", Role::Owner))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_active_subscription() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/subscriptions"))
            .and(query_param("user_id", "eq.u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "u1", "start_date": "2024-01-01", "end_date": "2024-12-31"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let status = client.subscription_status(&session(), today()).await.unwrap();
        assert!(matches!(status, SubscriptionStatus::Active { .. }));
        assert_eq!(status.end_date(), NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[tokio::test]
    async fn test_no_row_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/subscriptions"))
            .and(wiremock::matchers::header("accept", "application/vnd.pgrst.object+json"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({"code": "PGRST116", "message": "0 rows"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.current_subscription(&session()).await.unwrap().is_none());
        let status = client.subscription_status(&session(), today()).await.unwrap();
        assert_eq!(status, SubscriptionStatus::None);
        assert!(status.grants_access());
    }

    #[tokio::test]
    async fn test_lookup_failure_does_not_block() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let status = client.subscription_status(&session(), today()).await.unwrap();
        assert!(status.grants_access());
    }

    #[tokio::test]
    async fn test_auth_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.subscription_status(&session(), today()).await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
    }
}
