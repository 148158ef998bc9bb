//! Dashboard aggregates. All three are computed server-side.

use idcashier_core::{DashboardStats, RecentTransaction, TopProduct};
use reqwest::Method;

use crate::client::SupabaseClient;
use crate::error::ClientResult;
use crate::session::Session;

impl SupabaseClient {
    pub async fn dashboard_stats(&self, session: &Session) -> ClientResult<DashboardStats> {
        self.invoke::<(), _>(session.token(), "dashboard-stats", Method::GET, None)
            .await
    }

    pub async fn recent_transactions(&self, session: &Session) -> ClientResult<Vec<RecentTransaction>> {
        self.invoke::<(), _>(session.token(), "dashboard-recent-transactions", Method::GET, None)
            .await
    }

    pub async fn top_products(&self, session: &Session) -> ClientResult<Vec<TopProduct>> {
        self.invoke::<(), _>(session.token(), "dashboard-top-products", Method::GET, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::*;
    use idcashier_core::{Money, Role, User};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> Session {
        Session::new(TOKEN, User::new("u1", "Sari", "sari@toko.id", Role::Owner))
    }

    #[tokio::test]
    async fn test_dashboard_stats_lenient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/functions/v1/dashboard-stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSales": "1500000", "totalProducts": 42, "totalTransactions": null, "growth": "+12%"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let stats = client.dashboard_stats(&session()).await.unwrap();
        assert_eq!(stats.total_sales, Money::from_rupiah(1_500_000));
        assert_eq!(stats.total_products, 42);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.growth.as_deref(), Some("+12%"));
    }

    #[tokio::test]
    async fn test_top_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/functions/v1/dashboard-top-products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Kopi", "sold": 30},
                {"name": "Roti", "sold": "12"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let top = client.top_products(&session()).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].sold, 12);
    }

    #[tokio::test]
    async fn test_function_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/functions/v1/dashboard-recent-transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Akses tidak sah"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.recent_transactions(&session()).await.unwrap_err();
        assert!(err.is_auth_error());
    }
}
