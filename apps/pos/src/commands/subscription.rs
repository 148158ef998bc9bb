//! Subscription page.

use chrono::NaiveDate;
use idcashier_client::SupabaseClient;
use idcashier_core::subscription::{calculate_subscription_period, SubscriptionPeriod};
use idcashier_core::SubscriptionStatus;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub status: SubscriptionStatus,
    pub grants_access: bool,
    pub days_remaining: i64,
}

impl SubscriptionView {
    pub fn new(status: SubscriptionStatus, today: NaiveDate) -> Self {
        SubscriptionView {
            status,
            grants_access: status.grants_access(),
            days_remaining: status.days_remaining(today),
        }
    }
}

/// Status of the account that pays: the owner, also for cashiers.
///
/// Only authentication failures are errors; a failed lookup shows as no
/// subscription.
pub async fn get_subscription(
    client: &SupabaseClient,
    session: &SessionState,
    today: NaiveDate,
) -> ApiResult<SubscriptionView> {
    let current = session.require()?;
    let status = client.subscription_status(&current, today).await?;
    debug!(?status, "Subscription status");
    Ok(SubscriptionView::new(status, today))
}

/// The period that buying `months` more would produce.
pub fn preview_extension(status: &SubscriptionStatus, months: u32, today: NaiveDate) -> SubscriptionPeriod {
    calculate_subscription_period(today, status.end_date(), months, today)
}
