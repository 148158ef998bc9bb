//! Dashboard page. The three aggregates are independent and load together.

use idcashier_client::SupabaseClient;
use idcashier_core::{DashboardStats, RecentTransaction, TopProduct};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::SessionState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_transactions: Vec<RecentTransaction>,
    pub top_products: Vec<TopProduct>,
}

pub async fn load_dashboard(client: &SupabaseClient, session: &SessionState) -> ApiResult<Dashboard> {
    let current = session.require()?;
    let (stats, recent_transactions, top_products) = tokio::try_join!(
        client.dashboard_stats(&current),
        client.recent_transactions(&current),
        client.top_products(&current),
    )?;
    Ok(Dashboard {
        stats,
        recent_transactions,
        top_products,
    })
}
